use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::equipment::{
        CreateEquipmentInput, EquipmentFilters, EquipmentListResponse, EquipmentResponse,
        UpdateEquipmentInput,
    },
    ApiResponse, AppState,
};

pub fn equipment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_equipment).get(list_equipment))
        .route("/:id", get(get_equipment).put(update_equipment))
        .route("/:id/scrap", post(scrap_equipment))
}

/// Register equipment
#[utoipa::path(
    post,
    path = "/api/v1/equipment",
    request_body = CreateEquipmentInput,
    responses(
        (status = 201, description = "Equipment created", body = ApiResponse<EquipmentResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateEquipmentInput>,
) -> Result<(StatusCode, Json<ApiResponse<EquipmentResponse>>), ServiceError> {
    let equipment = state
        .services
        .equipment
        .create_equipment(&auth_user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(equipment))))
}

/// List equipment
#[utoipa::path(
    get,
    path = "/api/v1/equipment",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("department_id" = Option<Uuid>, Query, description = "Filter by department"),
        ("critical_only" = Option<bool>, Query, description = "Only critical equipment"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Equipment retrieved", body = ApiResponse<EquipmentListResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<EquipmentFilters>,
) -> Result<Json<ApiResponse<EquipmentListResponse>>, ServiceError> {
    let result = state
        .services
        .equipment
        .list_equipment(&auth_user, filters)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Get one piece of equipment
#[utoipa::path(
    get,
    path = "/api/v1/equipment/{id}",
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment retrieved", body = ApiResponse<EquipmentResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EquipmentResponse>>, ServiceError> {
    let equipment = state
        .services
        .equipment
        .get_equipment(&auth_user, id)
        .await?;
    Ok(Json(ApiResponse::success(equipment)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/api/v1/equipment/{id}",
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = UpdateEquipmentInput,
    responses(
        (status = 200, description = "Equipment updated", body = ApiResponse<EquipmentResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEquipmentInput>,
) -> Result<Json<ApiResponse<EquipmentResponse>>, ServiceError> {
    let equipment = state
        .services
        .equipment
        .update_equipment(&auth_user, id, input)
        .await?;
    Ok(Json(ApiResponse::success(equipment)))
}

/// Scrap equipment
#[utoipa::path(
    post,
    path = "/api/v1/equipment/{id}/scrap",
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment scrapped", body = ApiResponse<EquipmentResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn scrap_equipment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EquipmentResponse>>, ServiceError> {
    let equipment = state
        .services
        .equipment
        .scrap_equipment(&auth_user, id)
        .await?;
    Ok(Json(ApiResponse::success(equipment)))
}
