use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};

use crate::{
    auth::AuthUser,
    entities::company::Model as CompanyModel,
    errors::ServiceError,
    services::companies::{RegisterCompanyInput, RegisterCompanyResponse},
    ApiResponse, AppState,
};

pub fn company_routes() -> Router<AppState> {
    Router::new().route("/register", post(register_company))
}

/// Register a new company with its first admin user
#[utoipa::path(
    post,
    path = "/api/v1/companies/register",
    request_body = RegisterCompanyInput,
    responses(
        (status = 201, description = "Company registered", body = ApiResponse<RegisterCompanyResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    )
)]
pub async fn register_company(
    State(state): State<AppState>,
    Json(input): Json<RegisterCompanyInput>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterCompanyResponse>>), ServiceError> {
    let result = state.services.companies.register(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(result))))
}

/// Company the current user belongs to
#[utoipa::path(
    get,
    path = "/api/v1/companies/me",
    responses(
        (status = 200, description = "Company retrieved", body = ApiResponse<CompanyModel>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn my_company(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<CompanyModel>>, ServiceError> {
    let company = state
        .services
        .companies
        .get_company(auth_user.company_id)
        .await?;
    Ok(Json(ApiResponse::success(company)))
}
