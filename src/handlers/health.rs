use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;

use crate::{db, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: ComponentStatus,
    pub database: ComponentStatus,
    pub latency_ms: u128,
}

/// Liveness probe: the process is up.
async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Readiness probe: the service can reach its database.
async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let start = Instant::now();
    match db::check_connection(&state.db).await {
        Ok(()) => Ok(Json(ReadinessResponse {
            status: ComponentStatus::Up,
            database: ComponentStatus::Up,
            latency_ms: start.elapsed().as_millis(),
        })),
        Err(_) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: ComponentStatus::Down,
                database: ComponentStatus::Down,
                latency_ms: start.elapsed().as_millis(),
            }),
        )),
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/live", get(liveness_check))
        .route("/ready", get(readiness_check))
}
