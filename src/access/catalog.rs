//! Application routes, their required permissions, and the sidebar navigation.

use serde::Serialize;

pub const HOME_PATH: &str = "/home";
pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// Home and the application root are reachable by every signed-in user.
pub fn is_home_path(path: &str) -> bool {
    path == HOME_PATH || path == ROOT_PATH || path.is_empty()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppRoute {
    Home,
    MboManagement,
    MboManagementDetails,
    OutletDetails,
    UserManagement,
}

const OUTLET_READ: &[&str] = &["outlet:read:own", "outlet:read:any"];
const USER_READ: &[&str] = &["user:read:own", "user:read:any"];

impl AppRoute {
    /// Table order; the first matching pattern wins.
    pub const ALL: [AppRoute; 5] = [
        AppRoute::Home,
        AppRoute::MboManagement,
        AppRoute::MboManagementDetails,
        AppRoute::OutletDetails,
        AppRoute::UserManagement,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AppRoute::Home => "HOME",
            AppRoute::MboManagement => "MBO_MANAGEMENT",
            AppRoute::MboManagementDetails => "MBO_MANAGEMENT_DETAILS",
            AppRoute::OutletDetails => "OUTLET_DETAILS",
            AppRoute::UserManagement => "USER_MANAGEMENT",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AppRoute::Home => "Home",
            AppRoute::MboManagement => "MBO Management",
            AppRoute::MboManagementDetails => "MBO Details",
            AppRoute::OutletDetails => "Outlet Details",
            AppRoute::UserManagement => "User Management",
        }
    }

    pub fn pattern(self) -> &'static str {
        match self {
            AppRoute::Home => HOME_PATH,
            AppRoute::MboManagement => "/dealer/:dealerId/mbo-management",
            AppRoute::MboManagementDetails => "/dealer/:dealerId/mbo-management/:mboId",
            AppRoute::OutletDetails => "/dealer/:dealerId/outlet/:outletId/details",
            AppRoute::UserManagement => "/dealer/:dealerId/users",
        }
    }

    /// Any one of these grants access.
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            AppRoute::Home => &[],
            AppRoute::MboManagement
            | AppRoute::MboManagementDetails
            | AppRoute::OutletDetails => OUTLET_READ,
            AppRoute::UserManagement => USER_READ,
        }
    }

    /// Fills the named segments left to right. Missing params keep their marker.
    pub fn path(self, params: &[&str]) -> String {
        let mut params = params.iter();
        self.pattern()
            .split('/')
            .map(|seg| match seg.strip_prefix(':') {
                Some(_) => params.next().map(|p| p.to_string()).unwrap_or_else(|| seg.to_string()),
                None => seg.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn nav_item(self, params: &[&str]) -> NavItem {
        NavItem {
            key: self.key().to_string(),
            label: self.label().to_string(),
            path: self.path(params),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub key: String,
    pub label: String,
    pub path: String,
}

impl NavItem {
    pub fn new(key: &str, label: &str, path: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            path: path.to_string(),
        }
    }
}

/// The dashboard sidebar for one dealer.
pub fn standard_nav_items(dealer_id: &str) -> Vec<NavItem> {
    vec![
        AppRoute::Home.nav_item(&[]),
        AppRoute::MboManagement.nav_item(&[dealer_id]),
        AppRoute::UserManagement.nav_item(&[dealer_id]),
    ]
}
