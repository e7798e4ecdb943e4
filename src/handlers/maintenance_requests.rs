use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::maintenance_request::RequestStage,
    errors::ServiceError,
    services::maintenance_requests::{
        AssignTechnicianInput, BoardResponse, CreateRequestInput, RequestFilters,
        RequestListResponse, RequestResponse, TransitionPayload,
    },
    ApiResponse, AppState,
};

pub fn maintenance_request_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_request).get(list_requests))
        .route("/board", get(board))
        .route("/:id", get(get_request))
        .route("/:id/transition", post(transition_request))
        .route("/:id/assign", post(assign_technician))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequestBody {
    /// Target lifecycle stage.
    pub stage: RequestStage,
    pub duration_hours: Option<f64>,
    pub notes: Option<String>,
    pub expected_version: Option<i32>,
}

/// Create a maintenance request
#[utoipa::path(
    post,
    path = "/api/v1/maintenance-requests",
    request_body = CreateRequestInput,
    responses(
        (status = 201, description = "Request created", body = ApiResponse<RequestResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateRequestInput>,
) -> Result<(StatusCode, Json<ApiResponse<RequestResponse>>), ServiceError> {
    let request = state
        .services
        .maintenance_requests
        .create_request(&auth_user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(request))))
}

/// List maintenance requests
#[utoipa::path(
    get,
    path = "/api/v1/maintenance-requests",
    params(
        ("stage" = Option<String>, Query, description = "Filter by lifecycle stage"),
        ("request_type" = Option<String>, Query, description = "Filter by request type"),
        ("priority" = Option<String>, Query, description = "Filter by priority"),
        ("technician_id" = Option<Uuid>, Query, description = "Filter by assigned technician"),
        ("equipment_id" = Option<Uuid>, Query, description = "Filter by equipment"),
        ("overdue_only" = Option<bool>, Query, description = "Only overdue requests"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Requests retrieved", body = ApiResponse<RequestListResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<RequestFilters>,
) -> Result<Json<ApiResponse<RequestListResponse>>, ServiceError> {
    let result = state
        .services
        .maintenance_requests
        .list_requests(&auth_user, filters)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Kanban board: requests grouped by stage
#[utoipa::path(
    get,
    path = "/api/v1/maintenance-requests/board",
    responses(
        (status = 200, description = "Board retrieved", body = ApiResponse<BoardResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn board(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<BoardResponse>>, ServiceError> {
    let board = state
        .services
        .maintenance_requests
        .board(&auth_user)
        .await?;
    Ok(Json(ApiResponse::success(board)))
}

/// Get a single maintenance request
#[utoipa::path(
    get,
    path = "/api/v1/maintenance-requests/{id}",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request retrieved", body = ApiResponse<RequestResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RequestResponse>>, ServiceError> {
    let request = state
        .services
        .maintenance_requests
        .get_request(&auth_user, id)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

/// Move a request to another lifecycle stage
#[utoipa::path(
    post,
    path = "/api/v1/maintenance-requests/{id}/transition",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = TransitionRequestBody,
    responses(
        (status = 200, description = "Request transitioned", body = ApiResponse<RequestResponse>),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn transition_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequestBody>,
) -> Result<Json<ApiResponse<RequestResponse>>, ServiceError> {
    let payload = TransitionPayload {
        duration_hours: body.duration_hours,
        notes: body.notes,
        expected_version: body.expected_version,
    };
    let request = state
        .services
        .maintenance_requests
        .transition_stage(&auth_user, id, body.stage, payload)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

/// Assign or clear the technician on a request
#[utoipa::path(
    post,
    path = "/api/v1/maintenance-requests/{id}/assign",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = AssignTechnicianInput,
    responses(
        (status = 200, description = "Assignment updated", body = ApiResponse<RequestResponse>),
        (status = 400, description = "Invalid assignee", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn assign_technician(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<AssignTechnicianInput>,
) -> Result<Json<ApiResponse<RequestResponse>>, ServiceError> {
    let request = state
        .services
        .maintenance_requests
        .assign_technician(&auth_user, id, input)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}
