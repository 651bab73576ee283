use super::RouteDef;
use crate::models::Role;

/// Management Route Group
///
/// Screens for roles that manage other users. Teachers are included because
/// they manage their own students; the backend scopes what each role sees.
pub fn admin_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::view("/user-management", "UserManagement").with_roles(&[
            Role::SuperAdmin,
            Role::Admin,
            Role::Teacher,
        ]),
    ]
}
