//! Render-time decisions for protected and public page trees.

use serde::Serialize;

use super::catalog::{HOME_PATH, is_home_path};
use super::resolver::PermissionResolver;
use crate::session::AuthSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session state is not settled yet; show a neutral waiting view.
    Wait,
    Render,
    Redirect {
        to: String,
        /// Where to go back to after a successful login.
        return_to: Option<String>,
    },
}

impl GuardDecision {
    fn redirect(to: &str, return_to: Option<&str>) -> Self {
        GuardDecision::Redirect {
            to: to.to_string(),
            return_to: return_to.map(str::to_string),
        }
    }
}

pub fn protected_route(
    session: &AuthSnapshot,
    resolver: &PermissionResolver<'_>,
    login_path: &str,
    path: &str,
) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Wait;
    }
    if !session.is_authenticated() {
        return GuardDecision::redirect(login_path, Some(path));
    }
    if is_home_path(path) {
        return GuardDecision::Render;
    }
    if resolver.check_route_access(path) {
        GuardDecision::Render
    } else {
        GuardDecision::redirect(resolver.first_authorized_route(), None)
    }
}

/// Guard for pages such as login. When `restricted`, a signed-in user is
/// sent to the stashed return-to path or home.
pub fn public_route(
    session: &AuthSnapshot,
    restricted: bool,
    return_to: Option<&str>,
) -> GuardDecision {
    if restricted && session.is_authenticated() {
        return GuardDecision::redirect(return_to.unwrap_or(HOME_PATH), None);
    }
    GuardDecision::Render
}

pub fn require_auth(session: &AuthSnapshot, current_path: &str, redirect_to: &str) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Wait;
    }
    if !session.is_authenticated() && current_path != redirect_to {
        return GuardDecision::redirect(redirect_to, Some(current_path));
    }
    GuardDecision::Render
}
