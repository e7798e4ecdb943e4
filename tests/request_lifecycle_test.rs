mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};

use gearguard_api::{
    entities::{
        maintenance_request::{RequestPriority, RequestStage, RequestType},
        user::UserRole,
    },
    errors::ServiceError,
    services::{
        categories::CategoryInput,
        maintenance_requests::{CreateRequestInput, TransitionPayload},
        teams::TeamInput,
    },
};

use common::TestCtx;

fn corrective_input(equipment_id: uuid::Uuid) -> CreateRequestInput {
    CreateRequestInput {
        subject: "Spindle vibrating above tolerance".to_string(),
        description: Some("Operator reports heavy vibration at 2000 rpm".to_string()),
        request_type: RequestType::Corrective,
        priority: RequestPriority::High,
        equipment_id,
        scheduled_date: None,
        category_id: None,
        team_id: None,
    }
}

#[tokio::test]
async fn new_request_starts_in_new_stage_at_version_one() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme Manufacturing").await;
    let employee = ctx.seed_user(company, UserRole::Employee, "op@acme.test").await;
    let machine = ctx.seed_equipment(company, "CNC Mill", 80).await;

    let request = ctx
        .requests
        .create_request(&employee, corrective_input(machine))
        .await
        .unwrap();

    assert_eq!(request.stage, RequestStage::New);
    assert_eq!(request.version, 1);
    assert_eq!(request.equipment_id, machine);
    assert_eq!(request.created_by, employee.user_id);
    assert!(request.start_date.is_none());
    assert!(!request.is_overdue);
}

#[tokio::test]
async fn preventive_request_requires_scheduled_date() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let employee = ctx.seed_user(company, UserRole::Employee, "op@acme.test").await;
    let machine = ctx.seed_equipment(company, "Lathe", 90).await;

    let mut input = corrective_input(machine);
    input.request_type = RequestType::Preventive;

    let err = ctx
        .requests
        .create_request(&employee, input)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn request_against_scrapped_equipment_is_rejected() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "Old Press", 10).await;

    ctx.equipment.scrap_equipment(&manager, machine).await.unwrap();

    let err = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn equipment_in_another_company_is_invisible() {
    let ctx = TestCtx::new().await;
    let acme = ctx.seed_company("Acme").await;
    let rival = ctx.seed_company("Rival Corp").await;
    let employee = ctx.seed_user(acme, UserRole::Employee, "op@acme.test").await;
    let foreign_machine = ctx.seed_equipment(rival, "Rival Press", 70).await;

    let err = ctx
        .requests
        .create_request(&employee, corrective_input(foreign_machine))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn full_lifecycle_new_to_repaired() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "CNC Mill", 60).await;

    let request = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap();

    let in_progress = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::InProgress,
            TransitionPayload::default(),
        )
        .await
        .unwrap();
    assert_eq!(in_progress.stage, RequestStage::InProgress);
    assert!(in_progress.start_date.is_some());
    assert_eq!(in_progress.version, 2);

    let repaired = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::Repaired,
            TransitionPayload {
                duration_hours: Some(3.5),
                notes: Some("Replaced spindle bearing".to_string()),
                expected_version: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(repaired.stage, RequestStage::Repaired);
    assert_eq!(repaired.duration_hours, Some(3.5));
    assert!(repaired.completion_date.is_some());
    assert_eq!(repaired.notes.as_deref(), Some("Replaced spindle bearing"));
    assert_eq!(repaired.version, 3);
}

#[tokio::test]
async fn repaired_requires_positive_duration() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "CNC Mill", 60).await;

    let request = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap();
    ctx.requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::InProgress,
            TransitionPayload::default(),
        )
        .await
        .unwrap();

    // Missing duration
    let err = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::Repaired,
            TransitionPayload::default(),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    // Non-positive duration
    let err = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::Repaired,
            TransitionPayload {
                duration_hours: Some(0.0),
                notes: None,
                expected_version: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn stage_skips_and_terminal_exits_are_rejected() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "CNC Mill", 60).await;

    let request = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap();

    // NEW -> REPAIRED skips IN_PROGRESS
    let err = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::Repaired,
            TransitionPayload {
                duration_hours: Some(1.0),
                notes: None,
                expected_version: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition(_));

    // Reach a terminal stage, then try to leave it
    ctx.requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::Scrap,
            TransitionPayload::default(),
        )
        .await
        .unwrap();
    for target in [RequestStage::New, RequestStage::InProgress, RequestStage::Repaired] {
        let err = ctx
            .requests
            .transition_stage(&manager, request.id, target, TransitionPayload::default())
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::InvalidTransition(_));
    }
}

#[tokio::test]
async fn same_stage_transition_is_a_noop() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "CNC Mill", 60).await;

    let request = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap();

    let unchanged = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::New,
            TransitionPayload::default(),
        )
        .await
        .unwrap();
    assert_eq!(unchanged.stage, RequestStage::New);
    assert_eq!(unchanged.version, 1);
}

#[tokio::test]
async fn stale_expected_version_yields_conflict() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "CNC Mill", 60).await;

    let request = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap();

    // Another writer moves the request first.
    ctx.requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::InProgress,
            TransitionPayload::default(),
        )
        .await
        .unwrap();

    // A client still holding version 1 loses.
    let err = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::Scrap,
            TransitionPayload {
                duration_hours: None,
                notes: None,
                expected_version: Some(request.version),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn racing_transitions_have_exactly_one_winner() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let tech = ctx
        .seed_user(company, UserRole::Technician, "tech@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "Press Brake", 55).await;

    let request = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap();

    // Both writers read the request at version 1.
    let seen_version = request.version;

    let winner = ctx
        .requests
        .transition_stage(
            &tech,
            request.id,
            RequestStage::InProgress,
            TransitionPayload {
                expected_version: Some(seen_version),
                ..TransitionPayload::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(winner.stage, RequestStage::InProgress);
    assert_eq!(winner.version, seen_version + 1);

    // The loser's conditional write matches zero rows and changes nothing.
    let err = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::Scrap,
            TransitionPayload {
                expected_version: Some(seen_version),
                ..TransitionPayload::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    let after = ctx.requests.get_request(&manager, request.id).await.unwrap();
    assert_eq!(after.stage, RequestStage::InProgress);
    assert_eq!(after.version, seen_version + 1);
}

#[tokio::test]
async fn cross_tenant_category_and_team_references_are_rejected() {
    let ctx = TestCtx::new().await;
    let acme = ctx.seed_company("Acme").await;
    let rival = ctx.seed_company("Rival").await;
    let employee = ctx.seed_user(acme, UserRole::Employee, "op@acme.test").await;
    let rival_manager = ctx
        .seed_user(rival, UserRole::MaintenanceManager, "mgr@rival.test")
        .await;
    let machine = ctx.seed_equipment(acme, "CNC Mill", 70).await;

    let foreign_category = ctx
        .categories
        .create_category(
            &rival_manager,
            CategoryInput {
                name: "Rival Presses".to_string(),
                responsible_team_id: None,
            },
        )
        .await
        .unwrap();
    let foreign_team = ctx
        .teams
        .create_team(
            &rival_manager,
            TeamInput {
                name: "Rival Crew".to_string(),
            },
        )
        .await
        .unwrap();

    let mut input = corrective_input(machine);
    input.category_id = Some(foreign_category.id);
    let err = ctx
        .requests
        .create_request(&employee, input)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let mut input = corrective_input(machine);
    input.team_id = Some(foreign_team.id);
    let err = ctx
        .requests
        .create_request(&employee, input)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn employees_cannot_transition_requests() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let employee = ctx.seed_user(company, UserRole::Employee, "op@acme.test").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "CNC Mill", 60).await;

    let request = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap();

    let err = ctx
        .requests
        .transition_stage(
            &employee,
            request.id,
            RequestStage::InProgress,
            TransitionPayload::default(),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));
}

#[tokio::test]
async fn overdue_is_derived_and_clears_on_completion() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "Boiler", 50).await;

    let mut input = corrective_input(machine);
    input.request_type = RequestType::Preventive;
    input.scheduled_date = Some(Utc::now() - Duration::days(2));

    let request = ctx.requests.create_request(&manager, input).await.unwrap();
    assert!(request.is_overdue);

    ctx.requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::InProgress,
            TransitionPayload::default(),
        )
        .await
        .unwrap();
    let still_open = ctx.requests.get_request(&manager, request.id).await.unwrap();
    assert!(still_open.is_overdue);

    let repaired = ctx
        .requests
        .transition_stage(
            &manager,
            request.id,
            RequestStage::Repaired,
            TransitionPayload {
                duration_hours: Some(2.0),
                notes: None,
                expected_version: None,
            },
        )
        .await
        .unwrap();
    assert!(!repaired.is_overdue);
}

#[tokio::test]
async fn listing_filters_by_stage_and_overdue() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let machine = ctx.seed_equipment(company, "Conveyor", 70).await;

    let first = ctx
        .requests
        .create_request(&manager, corrective_input(machine))
        .await
        .unwrap();
    ctx.requests
        .transition_stage(
            &manager,
            first.id,
            RequestStage::InProgress,
            TransitionPayload::default(),
        )
        .await
        .unwrap();

    let mut overdue_input = corrective_input(machine);
    overdue_input.subject = "Quarterly belt inspection".to_string();
    overdue_input.request_type = RequestType::Preventive;
    overdue_input.scheduled_date = Some(Utc::now() - Duration::days(1));
    ctx.requests
        .create_request(&manager, overdue_input)
        .await
        .unwrap();

    let in_progress = ctx
        .requests
        .list_requests(
            &manager,
            gearguard_api::services::maintenance_requests::RequestFilters {
                stage: Some(RequestStage::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(in_progress.total, 1);
    assert_eq!(in_progress.requests[0].id, first.id);

    let overdue = ctx
        .requests
        .list_requests(
            &manager,
            gearguard_api::services::maintenance_requests::RequestFilters {
                overdue_only: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(overdue.total, 1);
    assert!(overdue.requests[0].is_overdue);
}

#[tokio::test]
async fn requests_are_not_visible_across_tenants() {
    let ctx = TestCtx::new().await;
    let acme = ctx.seed_company("Acme").await;
    let rival = ctx.seed_company("Rival").await;
    let acme_manager = ctx
        .seed_user(acme, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;
    let rival_manager = ctx
        .seed_user(rival, UserRole::MaintenanceManager, "mgr@rival.test")
        .await;
    let machine = ctx.seed_equipment(acme, "CNC Mill", 60).await;

    let request = ctx
        .requests
        .create_request(&acme_manager, corrective_input(machine))
        .await
        .unwrap();

    let err = ctx
        .requests
        .get_request(&rival_manager, request.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let listing = ctx
        .requests
        .list_requests(&rival_manager, Default::default())
        .await
        .unwrap();
    assert_eq!(listing.total, 0);
}
