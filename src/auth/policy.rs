//! Single authorization policy table consulted at the service boundary.
//!
//! Keyed by (role, action) so permission rules live in one place instead of
//! being duplicated per handler.

use crate::entities::user::UserRole;
use crate::errors::ServiceError;

/// Every permission-gated operation in the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRequest,
    ViewRequests,
    TransitionRequest,
    AssignTechnician,
    ViewEquipment,
    ViewOrganization,
    ManageEquipment,
    ScrapEquipment,
    ViewDashboard,
    ManageUsers,
    ManageDepartments,
    ManageTeams,
    ManageCategories,
}

/// The policy table. Everything not listed here is denied.
pub fn role_allows(role: UserRole, action: Action) -> bool {
    use Action::*;
    use UserRole::*;

    match action {
        // Any member of the company may raise and browse requests and see
        // the surrounding org structure.
        CreateRequest | ViewRequests | ViewEquipment | ViewOrganization | ViewDashboard => true,

        // Moving requests through the lifecycle is maintenance work.
        TransitionRequest | AssignTechnician => {
            matches!(role, Admin | MaintenanceManager | Technician)
        }

        ManageEquipment | ScrapEquipment | ManageTeams | ManageCategories => {
            matches!(role, Admin | MaintenanceManager)
        }

        ManageUsers | ManageDepartments => matches!(role, Admin),
    }
}

/// Returns `Forbidden` unless the policy table allows the action.
pub fn authorize(role: UserRole, action: Action) -> Result<(), ServiceError> {
    if role_allows(role, action) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "role '{}' may not perform {:?}",
            role, action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn employees_cannot_touch_the_lifecycle() {
        assert!(!role_allows(UserRole::Employee, Action::TransitionRequest));
        assert!(!role_allows(UserRole::Employee, Action::AssignTechnician));
        assert!(!role_allows(UserRole::Employee, Action::ScrapEquipment));
        assert_matches!(
            authorize(UserRole::Employee, Action::AssignTechnician),
            Err(ServiceError::Forbidden(_))
        );
    }

    #[test]
    fn everyone_may_raise_and_view_requests() {
        for role in [
            UserRole::Admin,
            UserRole::MaintenanceManager,
            UserRole::Technician,
            UserRole::Employee,
        ] {
            assert!(role_allows(role, Action::CreateRequest));
            assert!(role_allows(role, Action::ViewRequests));
            assert!(role_allows(role, Action::ViewOrganization));
            assert!(role_allows(role, Action::ViewDashboard));
        }
    }

    #[test]
    fn technicians_work_requests_but_not_equipment() {
        assert!(role_allows(UserRole::Technician, Action::TransitionRequest));
        assert!(role_allows(UserRole::Technician, Action::AssignTechnician));
        assert!(!role_allows(UserRole::Technician, Action::ManageEquipment));
        assert!(!role_allows(UserRole::Technician, Action::ScrapEquipment));
    }

    #[test]
    fn only_admins_manage_users_and_departments() {
        assert!(role_allows(UserRole::Admin, Action::ManageUsers));
        assert!(!role_allows(UserRole::MaintenanceManager, Action::ManageUsers));
        assert!(!role_allows(UserRole::MaintenanceManager, Action::ManageDepartments));
    }
}
