use std::sync::Arc;

use super::*;
use crate::access::{LOGIN_PATH, Scope};
use crate::client::{ApiClient, SessionEvent};
use crate::credentials::CredentialStore;
use crate::model::{AppConfig, SessionTokens, UserProfile};

fn user() -> UserProfile {
    UserProfile {
        id: "u-1".to_string(),
        name: "Ravi".to_string(),
        email: "ravi@example.com".to_string(),
        role: "outlet_manager".to_string(),
        permissions: vec!["OUTLET:READ:OWN".to_string()],
        dealership_id: Some("d-7".to_string()),
        outlet_id: Some("o-3".to_string()),
    }
}

fn controller_with(
    credentials: CredentialStore,
) -> (Arc<SessionController>, Arc<NavigationHistory>, ApiClient) {
    let client = ApiClient::new(&AppConfig::new("http://127.0.0.1:9")).expect("client");
    let service = SessionService::attach(client.clone(), credentials);
    let history = Arc::new(NavigationHistory::new());
    let controller = SessionController::new(service, history.clone());
    (controller, history, client)
}

#[test]
fn starts_uninitialized_and_loading() {
    let (controller, _, _) = controller_with(CredentialStore::in_memory());
    let snap = controller.snapshot();
    assert_eq!(snap.phase, AuthPhase::Uninitialized);
    assert!(snap.is_loading());
    assert!(!snap.is_authenticated());
}

#[test]
fn restore_adopts_a_complete_stored_session() {
    let credentials = CredentialStore::in_memory();
    credentials
        .save_session(&SessionTokens::access_only("at-1"), &user())
        .expect("seed");
    let (controller, _, client) = controller_with(credentials);
    client.set_logged_out();

    assert_eq!(controller.restore(), AuthPhase::Authenticated);
    let snap = controller.snapshot();
    assert!(snap.is_authenticated());
    assert!(!snap.is_loading());
    assert!(snap.has_role("outlet_manager"));
    assert!(snap.permissions().has_permission("outlet:read:own"));
    assert_eq!(client.access_token().as_deref(), Some("at-1"));
    assert!(!client.is_logged_out());
}

#[test]
fn restore_without_user_is_anonymous_and_closes_the_gate() {
    let credentials = CredentialStore::in_memory();
    credentials
        .save_tokens(&SessionTokens::access_only("at-1"))
        .expect("seed");
    let (controller, _, client) = controller_with(credentials);

    assert_eq!(controller.restore(), AuthPhase::Anonymous);
    assert!(!controller.snapshot().is_authenticated());
    assert!(client.is_logged_out());
}

#[tokio::test]
async fn logout_converges_locally_when_backend_is_down() {
    let credentials = CredentialStore::in_memory();
    credentials
        .save_session(&SessionTokens::access_only("at-1"), &user())
        .expect("seed");
    let (controller, history, client) = controller_with(credentials.clone());
    controller.restore();

    controller.logout().await;

    let snap = controller.snapshot();
    assert_eq!(snap.phase, AuthPhase::Anonymous);
    assert_eq!(snap.user, None);
    assert!(client.is_logged_out());
    assert_eq!(client.access_token(), None);
    assert_eq!(credentials.tokens().expect("read"), None);
    assert_eq!(history.current().as_deref(), Some(LOGIN_PATH));

    // Idempotent.
    controller.logout().await;
    assert!(client.is_logged_out());
}

#[test]
fn refresh_failure_event_ends_the_session() {
    let credentials = CredentialStore::in_memory();
    credentials
        .save_session(&SessionTokens::access_only("at-1"), &user())
        .expect("seed");
    let (controller, history, client) = controller_with(credentials);
    controller.restore();

    controller.apply_event(&SessionEvent::RefreshFailed {
        reason: "expired".to_string(),
    });

    let snap = controller.snapshot();
    assert_eq!(snap.phase, AuthPhase::Anonymous);
    assert!(!snap.is_authenticated());
    assert!(snap.error.as_deref().is_some_and(|e| e.contains("expired")));
    assert!(client.is_logged_out());
    assert_eq!(history.visited(), vec![LOGIN_PATH.to_string()]);
}

#[test]
fn token_refreshed_event_updates_the_mirrored_tokens() {
    let credentials = CredentialStore::in_memory();
    credentials
        .save_session(&SessionTokens::access_only("at-1"), &user())
        .expect("seed");
    let (controller, _, _) = controller_with(credentials);
    controller.restore();

    controller.apply_event(&SessionEvent::TokenRefreshed {
        access_token: "at-2".to_string(),
    });
    assert_eq!(
        controller.snapshot().tokens,
        Some(SessionTokens::access_only("at-2"))
    );
}

#[test]
fn snapshot_permissions_follow_scope_fallback() {
    let mut u = user();
    u.permissions = vec!["user:read:any".to_string()];
    let snap = AuthSnapshot {
        phase: AuthPhase::Authenticated,
        user: Some(u),
        tokens: Some(SessionTokens::access_only("at-1")),
        error: None,
    };
    let perms = snap.permissions();
    assert!(perms.has_permission("user:read:own"));
    assert!(!perms.has_permission("user:update:own"));
    assert_eq!(
        "user:read:own".parse::<crate::access::Permission>().map(|p| p.scope()),
        Ok(Scope::Own)
    );
}
