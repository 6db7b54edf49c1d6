//! The HTTP client core.
//!
//! Every backend call flows through [`ApiClient`]. It owns the in-memory
//! access token, attaches it as a bearer credential, and recovers from a
//! 401 by running a single token refresh while later 401s queue behind it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, oneshot};

use crate::model::AppConfig;

mod error;
mod request;

pub use self::error::ApiError;
pub use self::request::{ApiResponse, PreparedRequest, RequestOptions};

const EVENT_CAPACITY: usize = 64;

/// The operation the client calls back into when an access token is rejected.
#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Obtains a fresh access token.
    async fn refresh_access_token(&self) -> Result<String, ApiError>;
}

/// Published by the client whenever a refresh cycle settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    TokenRefreshed { access_token: String },
    RefreshFailed { reason: String },
}

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    cookies: Arc<Jar>,
    logged_out: AtomicBool,
    state: Mutex<ClientState>,
    refresher: Mutex<Option<Weak<dyn TokenRefresher>>>,
    events: broadcast::Sender<SessionEvent>,
}

#[derive(Default)]
struct ClientState {
    access_token: Option<String>,
    refreshing: bool,
    queue: VecDeque<QueuedRequest>,
}

struct QueuedRequest {
    request: PreparedRequest,
    reply: oneshot::Sender<Result<ApiResponse, ApiError>>,
}

enum Recovery {
    Wait {
        reply: oneshot::Receiver<Result<ApiResponse, ApiError>>,
        start_refresh: bool,
    },
    RetryWith(Option<String>),
}

/// The claim on the single in-flight refresh.
///
/// Dropping an unsettled claim releases the flag and cancels every waiter.
struct RefreshClaim<'a> {
    client: &'a ApiClient,
    settled: bool,
}

impl RefreshClaim<'_> {
    /// Releases the flag and hands back the queue, installing `token` in the
    /// same critical section.
    fn settle(&mut self, token: Option<&str>) -> VecDeque<QueuedRequest> {
        self.settled = true;
        let mut st = self.client.state();
        if let Some(token) = token {
            st.access_token = Some(token.to_string());
        }
        st.refreshing = false;
        std::mem::take(&mut st.queue)
    }
}

impl Drop for RefreshClaim<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let queued = self.settle(None);
        tracing::warn!(queued = queued.len(), "token refresh abandoned");
        for QueuedRequest { reply, .. } in queued {
            let _ = reply.send(Err(ApiError::Cancelled));
        }
    }
}

impl ApiClient {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .user_agent("mbo-console")
            .cookie_provider(cookies.clone())
            .timeout(Duration::from_secs(cfg.request_timeout_secs.max(1)))
            .build()
            .context("build reqwest client")?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: cfg.base_url.trim_end_matches('/').to_string(),
                cookies,
                logged_out: AtomicBool::new(false),
                state: Mutex::new(ClientState::default()),
                refresher: Mutex::new(None),
                events,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Held weakly; the refresher normally owns a clone of this client.
    pub fn set_refresher(&self, refresher: &Arc<dyn TokenRefresher>) {
        let mut slot = self
            .inner
            .refresher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::downgrade(refresher));
    }

    /// Cookies the backend has set for the base URL, as a `Cookie` header value.
    ///
    /// Only for carrying the jar across processes; nothing here reads the
    /// individual cookies.
    pub fn cookie_header(&self) -> Option<String> {
        let url = Url::parse(&self.inner.base_url).ok()?;
        let value = self.inner.cookies.cookies(&url)?;
        value.to_str().ok().map(str::to_string)
    }

    pub fn restore_cookies(&self, header: &str) -> Result<()> {
        let url = Url::parse(&self.inner.base_url)
            .with_context(|| format!("parse base url {}", self.inner.base_url))?;
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.inner
                .cookies
                .add_cookie_str(&format!("{}; Path=/", pair), &url);
        }
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state().access_token.clone()
    }

    pub fn set_access_token(&self, token: Option<String>) {
        self.state().access_token = token.filter(|t| !t.is_empty());
    }

    pub fn is_logged_out(&self) -> bool {
        self.inner.logged_out.load(Ordering::SeqCst)
    }

    pub fn set_logged_out(&self) {
        self.inner.logged_out.store(true, Ordering::SeqCst);
    }

    pub fn reset_logged_out(&self) {
        self.inner.logged_out.store(false, Ordering::SeqCst);
    }

    pub fn is_refreshing(&self) -> bool {
        self.state().refreshing
    }

    pub fn queued_requests(&self) -> usize {
        self.state().queue.len()
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.dispatch(PreparedRequest::new(method, path, body, options))
            .await
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.request(Method::GET, path, None, options).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::POST, path, body, options).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::PUT, path, body, options).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::PATCH, path, body, options).await
    }

    pub async fn delete(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::DELETE, path, None, options).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.get(path, options).await?.json()
    }

    pub async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let body =
            serde_json::to_value(body).map_err(|err| ApiError::decode("request body", err))?;
        self.request(method, path, Some(body), options)
            .await?
            .json()
    }

    async fn dispatch(&self, mut req: PreparedRequest) -> Result<ApiResponse, ApiError> {
        let sent_with = self.access_token();
        let resp = self.send_once(&req, sent_with.as_deref()).await?;

        if resp.status != StatusCode::UNAUTHORIZED.as_u16()
            || req.retry
            || req.options.skip_refresh
            || self.is_logged_out()
        {
            return req.finish(resp);
        }

        // Decide and claim under one lock so two 401s cannot both start a refresh.
        // The request that claims the refresh waits in the queue like the rest.
        req.retry = true;
        let recovery = {
            let mut st = self.state();
            if !st.refreshing && st.access_token.is_some() && st.access_token != sent_with {
                Recovery::RetryWith(st.access_token.clone())
            } else {
                let start_refresh = !st.refreshing;
                st.refreshing = true;
                let (reply, rx) = oneshot::channel();
                st.queue.push_back(QueuedRequest {
                    request: req.clone(),
                    reply,
                });
                Recovery::Wait {
                    reply: rx,
                    start_refresh,
                }
            }
        };

        match recovery {
            Recovery::Wait {
                reply,
                start_refresh,
            } => {
                if start_refresh {
                    tracing::info!(path = %req.path, "access token rejected; refreshing");
                    // Owned by its own task so a dropped caller cannot strand the queue.
                    let client = self.clone();
                    tokio::spawn(async move { client.refresh_and_replay().await });
                } else {
                    tracing::debug!(path = %req.path, "refresh in progress; queueing request");
                }
                reply.await.unwrap_or(Err(ApiError::Cancelled))
            }
            Recovery::RetryWith(token) => {
                tracing::debug!(path = %req.path, "token already rotated; retrying");
                let resp = self.send_once(&req, token.as_deref()).await?;
                req.finish(resp)
            }
        }
    }

    async fn refresh_and_replay(&self) {
        let mut claim = RefreshClaim {
            client: self,
            settled: false,
        };
        let outcome = match self.refresher() {
            Some(refresher) => refresher.refresh_access_token().await,
            None => Err(ApiError::RefreshUnavailable),
        };

        match outcome {
            Ok(token) => {
                let queued = claim.settle(Some(&token));
                self.reset_logged_out();
                let _ = self.inner.events.send(SessionEvent::TokenRefreshed {
                    access_token: token.clone(),
                });

                // FIFO; a failed replay only reaches its own caller.
                tracing::debug!(queued = queued.len(), "refresh succeeded; replaying queue");
                for QueuedRequest { request, reply } in queued {
                    let result = self.replay(&request, &token).await;
                    let _ = reply.send(result);
                }
            }
            Err(err) => {
                let queued = claim.settle(None);
                self.set_logged_out();

                tracing::warn!(error = %err, queued = queued.len(), "token refresh failed");
                for QueuedRequest { reply, .. } in queued {
                    let _ = reply.send(Err(err.clone()));
                }
                let _ = self.inner.events.send(SessionEvent::RefreshFailed {
                    reason: err.to_string(),
                });
            }
        }
    }

    async fn replay(&self, req: &PreparedRequest, token: &str) -> Result<ApiResponse, ApiError> {
        let resp = self.send_once(req, Some(token)).await?;
        req.finish(resp)
    }

    async fn send_once(
        &self,
        req: &PreparedRequest,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let logged_out = self.is_logged_out();
        if logged_out && !req.options.allow_logged_out {
            tracing::debug!(path = %req.path, "refusing request while logged out");
            return Err(ApiError::LoggedOut);
        }

        let mut builder = self
            .inner
            .http
            .request(req.method.clone(), self.url(&req.path));
        if !req.options.query.is_empty() {
            builder = builder.query(&req.options.query);
        }
        if let Some(token) = token
            && !logged_out
        {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|err| req.transport_error(err))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|err| req.transport_error(err))?
            .to_vec();
        Ok(ApiResponse { status, body })
    }

    fn refresher(&self) -> Option<Arc<dyn TokenRefresher>> {
        self.inner
            .refresher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .and_then(Weak::upgrade)
    }

    fn state(&self) -> MutexGuard<'_, ClientState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
