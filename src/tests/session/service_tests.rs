use serde_json::json;

use super::service::extract_access_token;
use super::*;
use crate::client::{ApiClient, ApiError};
use crate::credentials::CredentialStore;
use crate::model::{AppConfig, SessionTokens};

#[test]
fn nested_refresh_shape_is_canonical() {
    let body = json!({"status": "success", "data": {"accessToken": "at-2"}});
    assert_eq!(extract_access_token(&body), Ok("at-2".to_string()));
}

#[test]
fn flat_refresh_shape_is_still_accepted() {
    let body = json!({"accessToken": "at-3"});
    assert_eq!(extract_access_token(&body), Ok("at-3".to_string()));
}

#[test]
fn nested_shape_wins_when_both_are_present() {
    let body = json!({"accessToken": "flat", "data": {"accessToken": "nested"}});
    assert_eq!(extract_access_token(&body), Ok("nested".to_string()));
}

#[test]
fn missing_or_empty_tokens_are_an_invalid_format() {
    for body in [
        json!({}),
        json!(null),
        json!({"data": {}}),
        json!({"data": {"accessToken": ""}}),
        json!({"accessToken": 42}),
    ] {
        assert_eq!(
            extract_access_token(&body),
            Err(ApiError::InvalidTokenResponse),
            "{body}"
        );
    }
}

#[tokio::test]
async fn logout_clears_storage_even_when_backend_is_unreachable() {
    let client = ApiClient::new(&AppConfig::new("http://127.0.0.1:9")).expect("client");
    let credentials = CredentialStore::in_memory();
    credentials
        .save_tokens(&SessionTokens::access_only("at-1"))
        .expect("seed tokens");
    let service = SessionService::attach(client, credentials);
    assert!(service.is_authenticated());

    service.logout().await.expect("logout succeeds locally");
    assert!(!service.is_authenticated());
    assert_eq!(service.current_user(), None);

    // Already logged out: still fine.
    service.logout().await.expect("second logout");
}

#[tokio::test]
async fn failed_refresh_clears_persisted_session() {
    let client = ApiClient::new(&AppConfig::new("http://127.0.0.1:9")).expect("client");
    let credentials = CredentialStore::in_memory();
    credentials
        .save_tokens(&SessionTokens::access_only("at-1"))
        .expect("seed tokens");
    let service = SessionService::attach(client, credentials);

    let err = service.refresh().await.expect_err("nothing is listening");
    assert!(matches!(err, ApiError::Transport { .. }), "{err:?}");
    assert_eq!(service.tokens(), None);
}
