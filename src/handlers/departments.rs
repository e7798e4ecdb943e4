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
    services::departments::{DepartmentInput, DepartmentResponse},
    ApiResponse, AppState,
};

pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_department).get(list_departments))
        .route("/:id", put(rename_department).delete(delete_department))
}

/// Create a department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = DepartmentInput,
    responses(
        (status = 201, description = "Department created", body = ApiResponse<DepartmentResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_department(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<DepartmentInput>,
) -> Result<(StatusCode, Json<ApiResponse<DepartmentResponse>>), ServiceError> {
    let department = state
        .services
        .departments
        .create_department(&auth_user, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(department))))
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Departments retrieved", body = ApiResponse<Vec<DepartmentResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_departments(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<DepartmentResponse>>>, ServiceError> {
    let departments = state.services.departments.list_departments(&auth_user).await?;
    Ok(Json(ApiResponse::success(departments)))
}

/// Rename a department
#[utoipa::path(
    put,
    path = "/api/v1/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = DepartmentInput,
    responses(
        (status = 200, description = "Department renamed", body = ApiResponse<DepartmentResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Department not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn rename_department(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<DepartmentInput>,
) -> Result<Json<ApiResponse<DepartmentResponse>>, ServiceError> {
    let department = state
        .services
        .departments
        .rename_department(&auth_user, id, input)
        .await?;
    Ok(Json(ApiResponse::success(department)))
}

/// Delete an empty department
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 400, description = "Department still has users", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Department not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_department(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .departments
        .delete_department(&auth_user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
