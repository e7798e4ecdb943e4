use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

use gearguard_api::{
    auth::{AuthConfig, AuthService, AuthUser},
    db::{self, DbConfig, DbPool},
    entities::{
        company,
        equipment::{self, EquipmentStatus},
        user::{self, UserRole},
    },
    events::{self, EventSender},
    services::{
        CategoryService, CompanyService, DashboardService, DepartmentService, EquipmentService,
        MaintenanceRequestService, TeamService, UserService,
    },
};

const TEST_JWT_SECRET: &str =
    "test-only-jwt-secret-test-only-jwt-secret-test-only-jwt-secret-64ch";

/// Service-level test harness over an in-memory SQLite database.
///
/// A single connection keeps the in-memory database alive for the whole
/// test and makes every service call observe the same schema.
pub struct TestCtx {
    pub db: Arc<DbPool>,
    pub auth: Arc<AuthService>,
    pub companies: CompanyService,
    pub users: UserService,
    pub departments: DepartmentService,
    pub teams: TeamService,
    pub categories: CategoryService,
    pub equipment: EquipmentService,
    pub requests: MaintenanceRequestService,
    pub dashboard: DashboardService,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestCtx {
    pub async fn new() -> Self {
        let cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        };
        let pool = db::establish_connection_with_config(&cfg)
            .await
            .expect("failed to open test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        let db = Arc::new(pool);

        let (tx, rx) = mpsc::channel(64);
        let event_sender = Arc::new(EventSender::new(tx));
        let event_task = tokio::spawn(events::process_events(rx));

        let auth = Arc::new(AuthService::new(
            AuthConfig::new(TEST_JWT_SECRET.to_string(), Duration::from_secs(3600)),
            db.clone(),
        ));

        Self {
            companies: CompanyService::new(db.clone(), auth.clone()),
            users: UserService::new(db.clone(), auth.clone()),
            departments: DepartmentService::new(db.clone()),
            teams: TeamService::new(db.clone()),
            categories: CategoryService::new(db.clone()),
            equipment: EquipmentService::new(db.clone(), event_sender.clone()),
            requests: MaintenanceRequestService::new(db.clone(), event_sender.clone()),
            dashboard: DashboardService::new(db.clone()),
            auth,
            db,
            _event_task: event_task,
        }
    }

    pub async fn seed_company(&self, name: &str) -> Uuid {
        let now = Utc::now();
        let model = company::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed company");
        model.id
    }

    /// Inserts a user and returns the matching [`AuthUser`] for service calls.
    pub async fn seed_user(&self, company_id: Uuid, role: UserRole, email: &str) -> AuthUser {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            department_id: Set(None),
            name: Set(email.split('@').next().unwrap().to_string()),
            email: Set(email.to_string()),
            password_hash: Set(
                self.auth
                    .hash_password("correct horse battery staple")
                    .expect("failed to hash password"),
            ),
            role: Set(role),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed user");

        AuthUser {
            user_id: model.id,
            name: model.name,
            role: model.role,
            company_id: model.company_id,
            token_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn seed_equipment(&self, company_id: Uuid, name: &str, health: i32) -> Uuid {
        let now = Utc::now();
        let model = equipment::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            name: Set(name.to_string()),
            serial_number: Set(None),
            health: Set(health),
            status: Set(EquipmentStatus::Active),
            owner_id: Set(None),
            technician_id: Set(None),
            maintenance_team_id: Set(None),
            category_id: Set(None),
            department_id: Set(None),
            scrapped_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed equipment");
        model.id
    }
}
