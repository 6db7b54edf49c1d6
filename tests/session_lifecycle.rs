mod common;

use std::sync::Arc;

use anyhow::{Context, Result};

use mbo_console::access::{LOGIN_PATH, ROOT_PATH};
use mbo_console::client::RequestOptions;
use mbo_console::devserver::{
    ADMIN_EMAIL, ADMIN_PASSWORD, DEALERSHIP_ID, MANAGER_EMAIL, MANAGER_PASSWORD,
};
use mbo_console::model::RegisterRequest;
use mbo_console::session::AuthPhase;
use mbo_console::store::FileStorage;

#[tokio::test]
async fn login_persists_and_a_new_process_restores_it() -> Result<()> {
    let server = common::spawn_server().await?;
    let dir = tempfile::tempdir().context("create tempdir")?;
    let storage = Arc::new(FileStorage::new(dir.path().join("storage.json")));

    let first = common::Session::with_storage(&server.base_url(), storage.clone())?;
    assert_eq!(first.controller.snapshot().phase, AuthPhase::Anonymous);
    assert!(first.client.is_logged_out());

    let user = first
        .controller
        .login(MANAGER_EMAIL, MANAGER_PASSWORD)
        .await
        .context("login")?;
    assert_eq!(user.role, "outlet_manager");
    assert!(user.permissions.iter().any(|p| p == "outlet:read:own"));
    assert_eq!(first.history.current().as_deref(), Some(ROOT_PATH));
    assert!(!first.client.is_logged_out());

    let snap = first.controller.snapshot();
    assert_eq!(snap.phase, AuthPhase::Authenticated);
    assert!(snap.has_role("outlet_manager"));
    assert!(snap.permissions().has_permission("outlet:read:own"));
    assert!(!snap.permissions().has_permission("outlet:read:any"));

    // Only the access token is persisted; the refresh token stays in the cookie.
    let stored = first.credentials.tokens()?.context("stored tokens")?;
    assert!(stored.refresh_token.is_empty());
    let raw = std::fs::read_to_string(dir.path().join("storage.json"))?;
    assert!(!raw.contains("refresh_token="));

    let second = common::Session::with_storage(&server.base_url(), storage)?;
    let restored = second.controller.snapshot();
    assert_eq!(restored.phase, AuthPhase::Authenticated);
    assert_eq!(restored.user.as_ref().map(|u| u.email.as_str()), Some(MANAGER_EMAIL));
    assert_eq!(second.client.access_token(), Some(stored.access_token));

    let resp = second
        .client
        .get("/outlets", RequestOptions::default())
        .await?;
    assert_eq!(resp.status, 200);
    Ok(())
}


#[tokio::test]
async fn corrupted_storage_file_reads_as_signed_out_and_login_replaces_it() -> Result<()> {
    let server = common::spawn_server().await?;
    let dir = tempfile::tempdir().context("create tempdir")?;
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "{not json")?;
    let storage = Arc::new(FileStorage::new(path.clone()));

    let session = common::Session::with_storage(&server.base_url(), storage)?;
    assert_eq!(session.controller.snapshot().phase, AuthPhase::Anonymous);

    session
        .controller
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .context("login over a corrupted file")?;
    assert_eq!(session.controller.snapshot().phase, AuthPhase::Authenticated);
    assert!(session.credentials.user()?.is_some());

    let raw = std::fs::read_to_string(&path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    assert!(parsed.get("auth_user").is_some());
    Ok(())
}

#[tokio::test]
async fn logout_clears_everything_and_is_idempotent() -> Result<()> {
    let server = common::spawn_server().await?;
    let session = common::Session::new(&server.base_url())?;
    session
        .controller
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .context("login")?;
    assert!(session.client.cookie_header().is_some());

    session.controller.logout().await;
    let snap = session.controller.snapshot();
    assert_eq!(snap.phase, AuthPhase::Anonymous);
    assert_eq!(snap.user, None);
    assert_eq!(snap.error, None);
    assert!(session.client.is_logged_out());
    assert_eq!(session.client.access_token(), None);
    assert_eq!(session.credentials.tokens()?, None);
    assert_eq!(session.client.cookie_header(), None);
    assert_eq!(session.history.current().as_deref(), Some(LOGIN_PATH));

    session.controller.logout().await;
    assert_eq!(session.controller.snapshot().phase, AuthPhase::Anonymous);

    // The refresh cookie was revoked server side as well.
    let err = session
        .controller
        .service()
        .refresh()
        .await
        .expect_err("no refresh after logout");
    assert!(err.is_unauthorized(), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn logout_with_backend_gone_still_ends_the_session() -> Result<()> {
    let server = common::spawn_server().await?;
    let session = common::Session::new(&server.base_url())?;
    session
        .controller
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .context("login")?;
    server.shutdown().await?;

    session.controller.logout().await;
    let snap = session.controller.snapshot();
    assert_eq!(snap.phase, AuthPhase::Anonymous);
    assert!(!snap.is_authenticated());
    assert!(session.client.is_logged_out());
    assert_eq!(session.credentials.tokens()?, None);
    assert_eq!(session.credentials.user()?, None);
    Ok(())
}

#[tokio::test]
async fn failed_login_leaves_an_error_and_no_session() -> Result<()> {
    let server = common::spawn_server().await?;
    let session = common::Session::new(&server.base_url())?;

    let err = session
        .controller
        .login(ADMIN_EMAIL, "not-the-password")
        .await
        .expect_err("wrong password");
    assert_eq!(err.status(), Some(401));

    let snap = session.controller.snapshot();
    assert_eq!(snap.phase, AuthPhase::Anonymous);
    assert_eq!(snap.error.as_deref(), Some("Invalid credentials"));
    assert!(session.client.is_logged_out());
    assert_eq!(server.state().login_calls(), 1);
    assert_eq!(server.state().refresh_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn register_does_not_sign_in() -> Result<()> {
    let server = common::spawn_server().await?;
    let session = common::Session::new(&server.base_url())?;

    let req = RegisterRequest {
        name: "New Manager".to_string(),
        email: "new.manager@mbo.dev".to_string(),
        password: "secret-pass".to_string(),
        role_name: "outlet_manager".to_string(),
        dealership_id: DEALERSHIP_ID.to_string(),
        outlet_id: Some("o-2".to_string()),
    };
    let created = session.controller.register(&req).await.context("register")?;
    assert_eq!(created.email, req.email);
    assert_eq!(created.role, "outlet_manager");
    assert_eq!(session.controller.snapshot().phase, AuthPhase::Anonymous);
    assert_eq!(session.history.current().as_deref(), Some(LOGIN_PATH));

    let dup = session
        .controller
        .register(&req)
        .await
        .expect_err("duplicate email");
    assert_eq!(dup.status(), Some(409));
    assert_eq!(
        session.controller.snapshot().error.as_deref(),
        Some("User already exists")
    );

    let user = session
        .controller
        .login(&req.email, &req.password)
        .await
        .context("login as the new user")?;
    assert_eq!(user.outlet_id.as_deref(), Some("o-2"));
    Ok(())
}
