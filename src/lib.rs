//! GearGuard API Library
//!
//! Multi-tenant equipment maintenance tracking: equipment, maintenance
//! requests with a fixed lifecycle, teams and a company dashboard.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::db::DbPool;

/// Shared application state threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DbPool>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
        auth: Arc<auth::AuthService>,
    ) -> Self {
        let services = handlers::AppServices {
            companies: Arc::new(services::CompanyService::new(db.clone(), auth.clone())),
            users: Arc::new(services::UserService::new(db.clone(), auth.clone())),
            departments: Arc::new(services::DepartmentService::new(db.clone())),
            teams: Arc::new(services::TeamService::new(db.clone())),
            categories: Arc::new(services::CategoryService::new(db.clone())),
            equipment: Arc::new(services::EquipmentService::new(
                db.clone(),
                event_sender.clone(),
            )),
            maintenance_requests: Arc::new(services::MaintenanceRequestService::new(
                db.clone(),
                event_sender.clone(),
            )),
            dashboard: Arc::new(services::DashboardService::new(db.clone())),
        };
        Self {
            db,
            config,
            event_sender,
            auth,
            services,
        }
    }
}

/// Standard response envelope.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// All `/api/v1` routes. Everything except registration, login and the
/// health probes sits behind the bearer-token middleware.
pub fn api_v1_routes(auth_service: Arc<auth::AuthService>) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/companies/me", get(handlers::companies::my_company))
        .nest("/users", handlers::users::user_routes())
        .nest("/departments", handlers::departments::department_routes())
        .nest("/teams", handlers::teams::team_routes())
        .nest(
            "/equipment-categories",
            handlers::categories::category_routes(),
        )
        .nest("/equipment", handlers::equipment::equipment_routes())
        .nest(
            "/maintenance-requests",
            handlers::maintenance_requests::maintenance_request_routes(),
        )
        .nest("/dashboard", handlers::dashboard::dashboard_routes())
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            auth::auth_middleware,
        ));

    Router::new()
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/companies", handlers::companies::company_routes())
        .merge(protected)
}

fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers(tower_http::cors::Any);

    match config.cors_allowed_origins.as_deref() {
        Some("*") => layer.allow_origin(tower_http::cors::Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            layer.allow_origin(origins)
        }
        None => layer,
    }
}

/// Builds the full application router with middleware applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .nest("/api/v1", api_v1_routes(state.auth.clone()))
        .nest("/health", handlers::health::health_routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}
