mod common;

use assert_matches::assert_matches;

use gearguard_api::{
    entities::{equipment::EquipmentStatus, user::UserRole},
    errors::ServiceError,
    services::{
        categories::CategoryInput,
        equipment::{CreateEquipmentInput, EquipmentFilters, UpdateEquipmentInput},
    },
};

use common::TestCtx;

#[tokio::test]
async fn create_defaults_to_full_health_and_active() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;

    let created = ctx
        .equipment
        .create_equipment(
            &manager,
            CreateEquipmentInput {
                name: "Plasma Cutter".to_string(),
                serial_number: Some("PC-2041".to_string()),
                health: None,
                owner_id: None,
                technician_id: None,
                maintenance_team_id: None,
                category_id: None,
                department_id: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.health, 100);
    assert_eq!(created.status, EquipmentStatus::Active);
    assert!(!created.is_critical);
}

#[tokio::test]
async fn employees_cannot_manage_equipment() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let employee = ctx.seed_user(company, UserRole::Employee, "op@acme.test").await;

    let err = ctx
        .equipment
        .create_equipment(
            &employee,
            CreateEquipmentInput {
                name: "Forklift".to_string(),
                serial_number: None,
                health: None,
                owner_id: None,
                technician_id: None,
                maintenance_team_id: None,
                category_id: None,
                department_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));
}

#[tokio::test]
async fn health_below_threshold_marks_equipment_critical() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "Compressor", 29).await;
    let healthy = ctx.seed_equipment(company, "Generator", 30).await;

    let critical = ctx.equipment.get_equipment(&manager, machine).await.unwrap();
    assert!(critical.is_critical);

    let at_threshold = ctx.equipment.get_equipment(&manager, healthy).await.unwrap();
    assert!(!at_threshold.is_critical);

    let listing = ctx
        .equipment
        .list_equipment(
            &manager,
            EquipmentFilters {
                critical_only: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(listing.total, 1);
    assert_eq!(listing.equipment[0].id, machine);
}

#[tokio::test]
async fn scrap_is_terminal_and_idempotent() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "Old Lathe", 15).await;

    let scrapped = ctx.equipment.scrap_equipment(&manager, machine).await.unwrap();
    assert_eq!(scrapped.status, EquipmentStatus::Scrapped);
    assert!(scrapped.scrapped_at.is_some());
    // Scrapped equipment never counts as critical
    assert!(!scrapped.is_critical);

    let again = ctx.equipment.scrap_equipment(&manager, machine).await.unwrap();
    assert_eq!(again.scrapped_at, scrapped.scrapped_at);

    // The row survives, visible in status-filtered listings
    let listing = ctx
        .equipment
        .list_equipment(
            &manager,
            EquipmentFilters {
                status: Some(EquipmentStatus::Scrapped),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(listing.total, 1);
}

#[tokio::test]
async fn scrapped_equipment_rejects_updates() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "Old Lathe", 15).await;
    ctx.equipment.scrap_equipment(&manager, machine).await.unwrap();

    let err = ctx
        .equipment
        .update_equipment(
            &manager,
            machine,
            UpdateEquipmentInput {
                health: Some(80),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn update_cannot_set_scrapped_status_directly() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "Press", 55).await;

    let err = ctx
        .equipment
        .update_equipment(
            &manager,
            machine,
            UpdateEquipmentInput {
                status: Some(EquipmentStatus::Scrapped),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn cross_tenant_references_are_rejected() {
    let ctx = TestCtx::new().await;
    let acme = ctx.seed_company("Acme").await;
    let rival = ctx.seed_company("Rival").await;
    let manager = ctx
        .seed_user(acme, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let rival_tech = ctx
        .seed_user(rival, UserRole::Technician, "tech@rival.test")
        .await;
    let rival_manager = ctx
        .seed_user(rival, UserRole::MaintenanceManager, "mgr@rival.test")
        .await;

    let foreign_category = ctx
        .categories
        .create_category(
            &rival_manager,
            CategoryInput {
                name: "Rival CNC".to_string(),
                responsible_team_id: None,
            },
        )
        .await
        .unwrap();

    // A technician from another tenant does not exist from Acme's side
    let err = ctx
        .equipment
        .create_equipment(
            &manager,
            CreateEquipmentInput {
                name: "Grinder".to_string(),
                serial_number: None,
                health: None,
                owner_id: None,
                technician_id: Some(rival_tech.user_id),
                maintenance_team_id: None,
                category_id: None,
                department_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // Nor can an update smuggle in a foreign category
    let machine = ctx.seed_equipment(acme, "Grinder", 85).await;
    let err = ctx
        .equipment
        .update_equipment(
            &manager,
            machine,
            UpdateEquipmentInput {
                category_id: Some(foreign_category.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn equipment_is_scoped_to_the_company() {
    let ctx = TestCtx::new().await;
    let acme = ctx.seed_company("Acme").await;
    let rival = ctx.seed_company("Rival").await;
    let manager = ctx
        .seed_user(acme, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let foreign = ctx.seed_equipment(rival, "Rival Press", 70).await;

    let err = ctx.equipment.get_equipment(&manager, foreign).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
