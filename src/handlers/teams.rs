use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::teams::{AddMemberInput, TeamInput, TeamResponse},
    ApiResponse, AppState,
};

pub fn team_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_team).get(list_teams))
        .route(
            "/:id",
            get(get_team).put(rename_team).delete(delete_team),
        )
        .route("/:id/members", post(add_member))
        .route("/:id/members/:user_id", axum::routing::delete(remove_member))
}

/// Create a maintenance team
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    request_body = TeamInput,
    responses(
        (status = 201, description = "Team created", body = ApiResponse<TeamResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_team(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<TeamInput>,
) -> Result<(StatusCode, Json<ApiResponse<TeamResponse>>), ServiceError> {
    let team = state.services.teams.create_team(&auth_user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(team))))
}

/// List teams with their members
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    responses(
        (status = 200, description = "Teams retrieved", body = ApiResponse<Vec<TeamResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_teams(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<TeamResponse>>>, ServiceError> {
    let teams = state.services.teams.list_teams(&auth_user).await?;
    Ok(Json(ApiResponse::success(teams)))
}

/// Get a team with its members
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}",
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team retrieved", body = ApiResponse<TeamResponse>),
        (status = 404, description = "Team not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_team(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TeamResponse>>, ServiceError> {
    let team = state.services.teams.get_team(&auth_user, id).await?;
    Ok(Json(ApiResponse::success(team)))
}

/// Rename a team
#[utoipa::path(
    put,
    path = "/api/v1/teams/{id}",
    params(("id" = Uuid, Path, description = "Team ID")),
    request_body = TeamInput,
    responses(
        (status = 200, description = "Team renamed", body = ApiResponse<TeamResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Team not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn rename_team(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<TeamInput>,
) -> Result<Json<ApiResponse<TeamResponse>>, ServiceError> {
    let team = state
        .services
        .teams
        .rename_team(&auth_user, id, input)
        .await?;
    Ok(Json(ApiResponse::success(team)))
}

/// Delete a team
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{id}",
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 400, description = "Team still responsible for categories", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Team not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_team(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.teams.delete_team(&auth_user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to a team
#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/members",
    params(("id" = Uuid, Path, description = "Team ID")),
    request_body = AddMemberInput,
    responses(
        (status = 200, description = "Member added", body = ApiResponse<TeamResponse>),
        (status = 400, description = "Already a member", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Team or user not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn add_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<AddMemberInput>,
) -> Result<Json<ApiResponse<TeamResponse>>, ServiceError> {
    let team = state
        .services
        .teams
        .add_member(&auth_user, id, input)
        .await?;
    Ok(Json(ApiResponse::success(team)))
}

/// Remove a user from a team
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{id}/members/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Team ID"),
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Team or membership not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn remove_member(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .teams
        .remove_member(&auth_user, id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
