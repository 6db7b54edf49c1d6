//! In-memory development backend speaking the dashboard's REST contract.
//!
//! Used by the integration tests and by `mbo-dev-server` for local CLI work.
//! Access tokens are opaque random secrets stored as blake3 hashes; the
//! refresh token lives only in an HTTP-only `refresh_token` cookie.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

mod auth;
mod http_error;
mod resources;
mod seed;
mod state;
mod tokens;

pub use self::seed::{
    ADMIN_EMAIL, ADMIN_PASSWORD, DEALERSHIP_ID, MANAGER_EMAIL, MANAGER_OUTLET_ID,
    MANAGER_PASSWORD, VIEWER_EMAIL, VIEWER_PASSWORD,
};
pub use self::state::DevState;

pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Clone, Debug)]
pub struct DevServerConfig {
    pub addr: SocketAddr,

    /// Access tokens older than this are rejected with 401. `None` keeps
    /// them valid until revoked or expired by hand.
    pub access_ttl: Option<Duration>,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            access_ttl: None,
        }
    }
}

pub fn router(state: Arc<DevState>) -> Router {
    let authed = Router::new()
        .route("/users", get(resources::list_users).post(resources::create_user))
        .route(
            "/users/:id",
            get(resources::get_user)
                .put(resources::update_user)
                .delete(resources::delete_user),
        )
        .route("/roles", get(resources::list_roles).post(resources::create_role))
        .route(
            "/roles/:id",
            get(resources::get_role)
                .put(resources::update_role)
                .delete(resources::delete_role),
        )
        .route("/outlets", get(resources::list_outlets))
        .route("/outlets/:id", get(resources::get_outlet))
        .route("/dealerships", get(resources::list_dealerships))
        .route("/dealerships/:id", get(resources::get_dealership))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/refresh-token", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .merge(authed)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::count_requests,
        ))
        .with_state(state)
}

async fn healthz() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({"ok": true}))
}

/// A server running on the current tokio runtime. Dropping the handle stops it.
pub struct DevServer {
    addr: SocketAddr,
    state: Arc<DevState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DevServer {
    pub async fn spawn(cfg: DevServerConfig) -> Result<Self> {
        let state = Arc::new(DevState::seeded(cfg.access_ttl));
        let listener = bind_listener(cfg.addr).await?;
        let addr = listener.local_addr().context("read listener local addr")?;
        let app = router(state.clone());

        let (shutdown, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
            if let Err(err) = served {
                tracing::warn!(error = %err, "dev server stopped with error");
            }
        });
        tracing::info!(%addr, "dev server listening");

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &Arc<DevState> {
        &self.state
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await.context("join dev server task")?;
        }
        Ok(())
    }
}

impl Drop for DevServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Runs until ctrl-c; used by the `mbo-dev-server` binary.
pub async fn serve(cfg: DevServerConfig, addr_file: Option<&PathBuf>) -> Result<()> {
    let state = Arc::new(DevState::seeded(cfg.access_ttl));
    let listener = bind_listener(cfg.addr).await?;
    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("mbo-dev-server listening on {}", local_addr);
    maybe_write_addr_file(addr_file, local_addr)?;

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn bind_listener(addr: SocketAddr) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))
}

fn maybe_write_addr_file(addr_file: Option<&PathBuf>, local_addr: SocketAddr) -> Result<()> {
    if let Some(addr_file) = addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
#[path = "tests/devserver_tests.rs"]
mod tests;
