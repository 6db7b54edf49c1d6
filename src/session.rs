//! Login, logout, registration and token refresh, plus the in-process
//! authentication state the dashboard renders from.

mod controller;
mod navigation;
mod service;

pub use self::controller::{AuthPhase, AuthSnapshot, SessionController};
pub use self::navigation::{NavigationHistory, Navigator};
pub use self::service::SessionService;

#[cfg(test)]
#[path = "tests/session/service_tests.rs"]
mod service_tests;

#[cfg(test)]
#[path = "tests/session/controller_tests.rs"]
mod controller_tests;
