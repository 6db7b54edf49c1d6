use super::*;
use crate::model::{SessionTokens, UserProfile};
use crate::session::{AuthPhase, AuthSnapshot};

fn signed_in(permissions: &[&str]) -> AuthSnapshot {
    AuthSnapshot {
        phase: AuthPhase::Authenticated,
        user: Some(UserProfile {
            id: "u-1".to_string(),
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            role: "outlet_manager".to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            dealership_id: Some("d-1".to_string()),
            outlet_id: None,
        }),
        tokens: Some(SessionTokens::access_only("at-1")),
        error: None,
    }
}

fn anonymous() -> AuthSnapshot {
    AuthSnapshot {
        phase: AuthPhase::Anonymous,
        user: None,
        tokens: None,
        error: None,
    }
}

fn decide(session: &AuthSnapshot, path: &str) -> GuardDecision {
    let perms = session.permissions();
    let table = RouteTable::standard().expect("standard routes");
    let resolver = PermissionResolver::new(&perms, &table);
    protected_route(session, &resolver, LOGIN_PATH, path)
}

#[test]
fn waits_while_session_is_settling() {
    let snap = AuthSnapshot::uninitialized();
    assert_eq!(decide(&snap, "/dealer/d-1/users"), GuardDecision::Wait);
    assert_eq!(require_auth(&snap, "/home", LOGIN_PATH), GuardDecision::Wait);
}

#[test]
fn anonymous_visitors_go_to_login_with_return_path() {
    assert_eq!(
        decide(&anonymous(), "/dealer/d-1/users"),
        GuardDecision::Redirect {
            to: LOGIN_PATH.to_string(),
            return_to: Some("/dealer/d-1/users".to_string()),
        }
    );
}

#[test]
fn home_renders_for_any_signed_in_user() {
    assert_eq!(decide(&signed_in(&[]), HOME_PATH), GuardDecision::Render);
    assert_eq!(decide(&signed_in(&[]), ROOT_PATH), GuardDecision::Render);
}

#[test]
fn denied_routes_redirect_home() {
    assert_eq!(
        decide(&signed_in(&["outlet:read:own"]), "/dealer/d-1/users"),
        GuardDecision::Redirect {
            to: HOME_PATH.to_string(),
            return_to: None,
        }
    );
    assert_eq!(
        decide(&signed_in(&["outlet:read:own"]), "/dealer/d-1/mbo-management"),
        GuardDecision::Render
    );
}

#[test]
fn token_without_user_still_counts_as_signed_in() {
    let mut snap = signed_in(&[]);
    snap.user = None;
    assert_eq!(decide(&snap, "/unlisted"), GuardDecision::Render);
}

#[test]
fn restricted_public_pages_bounce_signed_in_users() {
    let snap = signed_in(&[]);
    assert_eq!(
        public_route(&snap, true, Some("/dealer/d-1/users")),
        GuardDecision::Redirect {
            to: "/dealer/d-1/users".to_string(),
            return_to: None,
        }
    );
    assert_eq!(
        public_route(&snap, true, None),
        GuardDecision::Redirect {
            to: HOME_PATH.to_string(),
            return_to: None,
        }
    );
    assert_eq!(public_route(&snap, false, None), GuardDecision::Render);
    assert_eq!(public_route(&anonymous(), true, None), GuardDecision::Render);
}

#[test]
fn require_auth_does_not_redirect_onto_itself() {
    assert_eq!(
        require_auth(&anonymous(), LOGIN_PATH, LOGIN_PATH),
        GuardDecision::Render
    );
    assert_eq!(
        require_auth(&anonymous(), "/home", LOGIN_PATH),
        GuardDecision::Redirect {
            to: LOGIN_PATH.to_string(),
            return_to: Some("/home".to_string()),
        }
    );
    assert_eq!(require_auth(&signed_in(&[]), "/home", LOGIN_PATH), GuardDecision::Render);
}
