pub mod auth;
pub mod categories;
pub mod companies;
pub mod dashboard;
pub mod departments;
pub mod equipment;
pub mod health;
pub mod maintenance_requests;
pub mod teams;
pub mod users;

use std::sync::Arc;

use crate::services::{
    CategoryService, CompanyService, DashboardService, DepartmentService, EquipmentService,
    MaintenanceRequestService, TeamService, UserService,
};

/// Shared service container handed to handlers through [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub companies: Arc<CompanyService>,
    pub users: Arc<UserService>,
    pub departments: Arc<DepartmentService>,
    pub teams: Arc<TeamService>,
    pub categories: Arc<CategoryService>,
    pub equipment: Arc<EquipmentService>,
    pub maintenance_requests: Arc<MaintenanceRequestService>,
    pub dashboard: Arc<DashboardService>,
}
