//! Client-side route permissions.
//!
//! Everything in this module only shapes what the dashboard offers. The
//! backend remains the authority on every request.

mod catalog;
mod guard;
mod permission;
mod resolver;
mod routes;

pub use self::catalog::{
    AppRoute, HOME_PATH, LOGIN_PATH, NavItem, ROOT_PATH, is_home_path, standard_nav_items,
};
pub use self::guard::{GuardDecision, protected_route, public_route, require_auth};
pub use self::permission::{Permission, PermissionParseError, PermissionSet, Scope, normalize};
pub use self::resolver::PermissionResolver;
pub use self::routes::{RoutePattern, RouteTable};

#[cfg(test)]
#[path = "tests/access/permission_tests.rs"]
mod permission_tests;

#[cfg(test)]
#[path = "tests/access/resolver_tests.rs"]
mod resolver_tests;

#[cfg(test)]
#[path = "tests/access/guard_tests.rs"]
mod guard_tests;
