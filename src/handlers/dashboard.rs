use axum::{extract::State, response::Json, routing::get, Router};

use crate::{
    auth::AuthUser, errors::ServiceError, services::dashboard::DashboardResponse, ApiResponse,
    AppState,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(summary))
}

/// Company-wide maintenance summary
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard retrieved", body = ApiResponse<DashboardResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<DashboardResponse>>, ServiceError> {
    let dashboard = state.services.dashboard.summary(&auth_user).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}
