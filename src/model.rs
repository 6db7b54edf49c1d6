mod auth;
mod config;
mod envelope;
mod resources;

pub use self::auth::{LoginData, LoginRequest, RegisterRequest, SessionTokens, UserProfile};
pub use self::config::{AppConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use self::envelope::{Envelope, Paginated, Pagination};
pub use self::resources::{
    Address, Dealership, NewRole, NewUser, Outlet, OutletKind, PermissionRecord, Role, RoleSummary,
    RoleUpdate, User, UserUpdate,
};
