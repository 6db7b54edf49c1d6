//! Backend paths, relative to the configured base URL.

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_REFRESH_TOKEN: &str = "/auth/refresh-token";
pub const AUTH_LOGOUT: &str = "/auth/logout";

pub const USERS: &str = "/users";
pub const ROLES: &str = "/roles";
pub const OUTLETS: &str = "/outlets";
pub const DEALERSHIPS: &str = "/dealerships";
pub const HEALTHZ: &str = "/healthz";

pub fn user(id: &str) -> String {
    format!("{}/{}", USERS, id)
}

pub fn role(id: &str) -> String {
    format!("{}/{}", ROLES, id)
}

pub fn outlet(id: &str) -> String {
    format!("{}/{}", OUTLETS, id)
}

pub fn dealership(id: &str) -> String {
    format!("{}/{}", DEALERSHIPS, id)
}
