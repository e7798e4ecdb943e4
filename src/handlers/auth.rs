use axum::{extract::State, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::AuthUser, entities::user::UserRole, errors::ServiceError, ApiResponse, AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub company_id: Uuid,
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ServiceError> {
    let (user, token) = state
        .auth
        .login(&request.email, &request.password)
        .await
        .map_err(|_| ServiceError::Unauthorized("Invalid email or password".to_string()))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        access_token: token.access_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
        user_id: user.id,
        name: user.name,
        role: user.role,
        company_id: user.company_id,
    })))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub company_id: Uuid,
}

/// Identity behind the presented token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<MeResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn me(auth_user: AuthUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::success(MeResponse {
        user_id: auth_user.user_id,
        name: auth_user.name,
        role: auth_user.role,
        company_id: auth_user.company_id,
    }))
}
