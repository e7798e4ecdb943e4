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
    services::users::{
        CreateUserInput, UpdateUserInput, UserFilters, UserListResponse, UserResponse,
    },
    ApiResponse, AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).put(update_user))
}

/// Create a user in the current company
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserInput,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ServiceError> {
    let user = state.services.users.create_user(&auth_user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// List users in the current company
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("department_id" = Option<Uuid>, Query, description = "Filter by department"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Users retrieved", body = ApiResponse<UserListResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<UserFilters>,
) -> Result<Json<ApiResponse<UserListResponse>>, ServiceError> {
    let result = state.services.users.list_users(&auth_user, filters).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Get a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ServiceError> {
    let user = state.services.users.get_user(&auth_user, id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// Update a user's role, department or active flag
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserInput,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<ApiResponse<UserResponse>>, ServiceError> {
    let user = state
        .services
        .users
        .update_user(&auth_user, id, input)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}
