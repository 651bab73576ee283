use super::RouteDef;
use crate::models::Role;

/// Authenticated Route Group
///
/// Screens for any signed-in user regardless of role. Listing every role
/// (rather than leaving the list empty) is what makes them protected.
pub fn authenticated_routes() -> Vec<RouteDef> {
    vec![RouteDef::view("/profile", "Profile").with_roles(&Role::ALL)]
}
