use super::catalog::{HOME_PATH, NavItem, is_home_path};
use super::permission::PermissionSet;
use super::routes::RouteTable;

/// Answers "may this user see that page" for navigation and rendering.
///
/// This is a convenience for the interface only. The backend enforces
/// authorization on every endpoint independently; nothing here is an
/// access-control boundary.
#[derive(Clone, Copy, Debug)]
pub struct PermissionResolver<'a> {
    permissions: &'a PermissionSet,
    routes: &'a RouteTable,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(permissions: &'a PermissionSet, routes: &'a RouteTable) -> Self {
        Self {
            permissions,
            routes,
        }
    }

    pub fn has_permission(&self, required: &str) -> bool {
        self.permissions.has_permission(required)
    }

    /// Unregistered routes and routes without requirements are open;
    /// otherwise any one of the listed permissions suffices.
    pub fn check_route_access(&self, path: &str) -> bool {
        if is_home_path(path) {
            return true;
        }
        match self.routes.find(path) {
            None => true,
            Some(route) if route.required().is_empty() => true,
            Some(route) => self.permissions.has_any(route.required()),
        }
    }

    /// Accessible entries in input order, with the home entry moved to the front.
    pub fn authorized_routes(&self, nav: &[NavItem]) -> Vec<NavItem> {
        let home = nav.iter().find(|item| item.path == HOME_PATH);
        let rest = nav
            .iter()
            .filter(|item| item.path != HOME_PATH)
            .filter(|item| self.check_route_access(&item.path));
        home.into_iter().chain(rest).cloned().collect()
    }

    pub fn first_authorized_route(&self) -> &'static str {
        HOME_PATH
    }
}
