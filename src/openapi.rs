use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "GearGuard API",
        version = "0.1.0",
        description = r#"
# GearGuard Equipment Maintenance API

Multi-tenant maintenance tracking: equipment, maintenance requests with a
fixed lifecycle (`new -> in_progress -> repaired`, side exit to `scrap`),
teams, and a company dashboard.

## Authentication

All endpoints except company registration, login and the health probes
require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```

## Pagination

List endpoints accept `page` (default 1) and `per_page` (default 20, max 100).
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Login and identity"),
        (name = "Companies", description = "Tenant registration"),
        (name = "Users", description = "User administration"),
        (name = "Departments", description = "Department administration"),
        (name = "Teams", description = "Maintenance teams"),
        (name = "Categories", description = "Equipment categories"),
        (name = "Equipment", description = "Equipment catalog"),
        (name = "Maintenance Requests", description = "Request lifecycle"),
        (name = "Dashboard", description = "Company-wide aggregates")
    ),
    paths(
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::companies::register_company,
        crate::handlers::companies::my_company,
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::departments::create_department,
        crate::handlers::departments::list_departments,
        crate::handlers::departments::rename_department,
        crate::handlers::departments::delete_department,
        crate::handlers::teams::create_team,
        crate::handlers::teams::list_teams,
        crate::handlers::teams::get_team,
        crate::handlers::teams::rename_team,
        crate::handlers::teams::delete_team,
        crate::handlers::teams::add_member,
        crate::handlers::teams::remove_member,
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::equipment::create_equipment,
        crate::handlers::equipment::list_equipment,
        crate::handlers::equipment::get_equipment,
        crate::handlers::equipment::update_equipment,
        crate::handlers::equipment::scrap_equipment,
        crate::handlers::maintenance_requests::create_request,
        crate::handlers::maintenance_requests::list_requests,
        crate::handlers::maintenance_requests::board,
        crate::handlers::maintenance_requests::get_request,
        crate::handlers::maintenance_requests::transition_request,
        crate::handlers::maintenance_requests::assign_technician,
        crate::handlers::dashboard::summary,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::errors::ErrorResponse,
            crate::entities::maintenance_request::RequestStage,
            crate::entities::maintenance_request::RequestType,
            crate::entities::maintenance_request::RequestPriority,
            crate::entities::equipment::EquipmentStatus,
            crate::entities::user::UserRole,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::MeResponse,
            crate::handlers::maintenance_requests::TransitionRequestBody,
            crate::services::companies::RegisterCompanyInput,
            crate::services::companies::RegisterCompanyResponse,
            crate::services::users::CreateUserInput,
            crate::services::users::UpdateUserInput,
            crate::services::users::UserResponse,
            crate::services::users::UserListResponse,
            crate::services::departments::DepartmentInput,
            crate::services::departments::DepartmentResponse,
            crate::services::teams::TeamInput,
            crate::services::teams::AddMemberInput,
            crate::services::teams::TeamResponse,
            crate::services::teams::TeamMemberResponse,
            crate::services::categories::CategoryInput,
            crate::services::categories::CategoryResponse,
            crate::services::equipment::CreateEquipmentInput,
            crate::services::equipment::UpdateEquipmentInput,
            crate::services::equipment::EquipmentResponse,
            crate::services::equipment::EquipmentListResponse,
            crate::services::maintenance_requests::CreateRequestInput,
            crate::services::maintenance_requests::AssignTechnicianInput,
            crate::services::maintenance_requests::RequestResponse,
            crate::services::maintenance_requests::RequestListResponse,
            crate::services::maintenance_requests::BoardResponse,
            crate::services::dashboard::DashboardResponse,
            crate::services::dashboard::StageCounts,
            crate::services::dashboard::TypeCounts,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
