pub mod categories;
pub mod companies;
pub mod dashboard;
pub mod departments;
pub mod equipment;
pub mod maintenance_requests;
pub mod teams;
pub mod users;

pub use categories::CategoryService;
pub use companies::CompanyService;
pub use dashboard::DashboardService;
pub use departments::DepartmentService;
pub use equipment::EquipmentService;
pub use maintenance_requests::MaintenanceRequestService;
pub use teams::TeamService;
pub use users::UserService;
