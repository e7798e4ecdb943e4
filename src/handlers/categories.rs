use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{post, put},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::categories::{CategoryInput, CategoryResponse},
    ApiResponse, AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category).get(list_categories))
        .route("/:id", put(update_category).delete(delete_category))
}

/// Create an equipment category
#[utoipa::path(
    post,
    path = "/api/v1/equipment-categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), ServiceError> {
    let category = state
        .services
        .categories
        .create_category(&auth_user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

/// List equipment categories
#[utoipa::path(
    get,
    path = "/api/v1/equipment-categories",
    responses(
        (status = 200, description = "Categories retrieved", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ServiceError> {
    let categories = state.services.categories.list_categories(&auth_user).await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// Update an equipment category
#[utoipa::path(
    put,
    path = "/api/v1/equipment-categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category or team not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ServiceError> {
    let category = state
        .services
        .categories
        .update_category(&auth_user, id, input)
        .await?;
    Ok(Json(ApiResponse::success(category)))
}

/// Delete an equipment category
#[utoipa::path(
    delete,
    path = "/api/v1/equipment-categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still has equipment", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .categories
        .delete_category(&auth_user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
