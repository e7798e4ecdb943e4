mod common;

use assert_matches::assert_matches;

use gearguard_api::{
    entities::user::UserRole,
    errors::ServiceError,
    services::{
        companies::RegisterCompanyInput,
        users::{CreateUserInput, UpdateUserInput},
    },
};

use common::TestCtx;

fn registration(company: &str, email: &str) -> RegisterCompanyInput {
    RegisterCompanyInput {
        company_name: company.to_string(),
        admin_name: "Pat Admin".to_string(),
        admin_email: email.to_string(),
        admin_password: "hunter2hunter2".to_string(),
    }
}

#[tokio::test]
async fn registration_creates_company_and_admin_who_can_log_in() {
    let ctx = TestCtx::new().await;

    let result = ctx
        .companies
        .register(registration("Acme Manufacturing", "pat@acme.test"))
        .await
        .unwrap();

    let (user, token) = ctx
        .auth
        .login("pat@acme.test", "hunter2hunter2")
        .await
        .unwrap();
    assert_eq!(user.id, result.admin_user_id);
    assert_eq!(user.company_id, result.company_id);
    assert_eq!(user.role, UserRole::Admin);

    let claims = ctx.auth.validate_token(&token.access_token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.company_id, result.company_id.to_string());
}

#[tokio::test]
async fn duplicate_email_registration_is_rejected() {
    let ctx = TestCtx::new().await;
    ctx.companies
        .register(registration("Acme", "pat@acme.test"))
        .await
        .unwrap();

    let err = ctx
        .companies
        .register(registration("Copycat Inc", "pat@acme.test"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn login_rejects_bad_password() {
    let ctx = TestCtx::new().await;
    ctx.companies
        .register(registration("Acme", "pat@acme.test"))
        .await
        .unwrap();

    let err = ctx.auth.login("pat@acme.test", "wrong-password").await;
    assert!(err.is_err());
}

#[tokio::test]
async fn only_admins_manage_users() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let admin = ctx.seed_user(company, UserRole::Admin, "admin@acme.test").await;
    let manager = ctx
        .seed_user(company, UserRole::MaintenanceManager, "mgr@acme.test")
        .await;

    let input = CreateUserInput {
        name: "New Technician".to_string(),
        email: "newtech@acme.test".to_string(),
        password: "changeme-now".to_string(),
        role: UserRole::Technician,
        department_id: None,
    };

    let err = ctx
        .users
        .create_user(
            &manager,
            CreateUserInput {
                email: "other@acme.test".to_string(),
                name: input.name.clone(),
                password: input.password.clone(),
                role: input.role,
                department_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    let created = ctx.users.create_user(&admin, input).await.unwrap();
    assert_eq!(created.role, UserRole::Technician);
    assert!(created.active);
}

#[tokio::test]
async fn admin_cannot_demote_or_deactivate_themselves() {
    let ctx = TestCtx::new().await;
    let company = ctx.seed_company("Acme").await;
    let admin = ctx.seed_user(company, UserRole::Admin, "admin@acme.test").await;

    let err = ctx
        .users
        .update_user(
            &admin,
            admin.user_id,
            UpdateUserInput {
                role: Some(UserRole::Employee),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = ctx
        .users
        .update_user(
            &admin,
            admin.user_id,
            UpdateUserInput {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn user_listing_is_scoped_and_filterable() {
    let ctx = TestCtx::new().await;
    let acme = ctx.seed_company("Acme").await;
    let rival = ctx.seed_company("Rival").await;
    let admin = ctx.seed_user(acme, UserRole::Admin, "admin@acme.test").await;
    ctx.seed_user(acme, UserRole::Technician, "tech@acme.test").await;
    ctx.seed_user(rival, UserRole::Technician, "tech@rival.test").await;

    let technicians = ctx
        .users
        .list_users(
            &admin,
            gearguard_api::services::users::UserFilters {
                role: Some(UserRole::Technician),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(technicians.total, 1);
    assert_eq!(technicians.users[0].email, "tech@acme.test");
}
