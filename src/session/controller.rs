use std::sync::{Arc, Weak};

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use super::navigation::Navigator;
use super::service::SessionService;
use crate::access::{LOGIN_PATH, PermissionSet, ROOT_PATH};
use crate::client::{ApiClient, ApiError, SessionEvent};
use crate::model::{RegisterRequest, SessionTokens, UserProfile};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Uninitialized,
    Restoring,
    Anonymous,
    Authenticating,
    Authenticated,
    LoggingOut,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    pub phase: AuthPhase,
    pub user: Option<UserProfile>,

    #[serde(skip)]
    pub tokens: Option<SessionTokens>,

    pub error: Option<String>,
}

impl AuthSnapshot {
    pub fn uninitialized() -> Self {
        Self {
            phase: AuthPhase::Uninitialized,
            user: None,
            tokens: None,
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            AuthPhase::Uninitialized
                | AuthPhase::Restoring
                | AuthPhase::Authenticating
                | AuthPhase::LoggingOut
        )
    }

    /// An access token is the only thing that counts.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.as_ref().is_some_and(|t| t.has_access_token())
    }

    pub fn permissions(&self) -> PermissionSet {
        PermissionSet::for_user(self.user.as_ref())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == role)
    }
}

/// Single writer of the authentication state the dashboard renders from.
///
/// State only moves through the named operations below and through
/// refresh outcomes reported by the client.
pub struct SessionController {
    service: Arc<SessionService>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<AuthSnapshot>,
}

impl SessionController {
    pub fn new(service: Arc<SessionService>, navigator: Arc<dyn Navigator>) -> Arc<Self> {
        let (state, _) = watch::channel(AuthSnapshot::uninitialized());
        Arc::new(Self {
            service,
            navigator,
            state,
        })
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    pub fn service(&self) -> &Arc<SessionService> {
        &self.service
    }

    fn client(&self) -> &ApiClient {
        self.service.client()
    }

    fn update(&self, f: impl FnOnce(&mut AuthSnapshot)) {
        self.state.send_modify(f);
    }

    /// Startup: adopt a persisted session if both halves are present.
    pub fn restore(&self) -> AuthPhase {
        self.update(|s| s.phase = AuthPhase::Restoring);

        match (self.service.current_user(), self.service.tokens()) {
            (Some(user), Some(tokens)) if tokens.has_access_token() => {
                self.client()
                    .set_access_token(Some(tokens.access_token.clone()));
                self.client().reset_logged_out();
                tracing::info!(user = %user.email, "session restored from storage");
                self.update(|s| {
                    s.phase = AuthPhase::Authenticated;
                    s.user = Some(user);
                    s.tokens = Some(tokens);
                    s.error = None;
                });
                AuthPhase::Authenticated
            }
            _ => {
                self.client().set_logged_out();
                tracing::debug!("no stored session");
                self.update(|s| {
                    s.phase = AuthPhase::Anonymous;
                    s.user = None;
                    s.tokens = None;
                });
                AuthPhase::Anonymous
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        self.update(|s| {
            s.phase = AuthPhase::Authenticating;
            s.error = None;
        });
        // The login call itself must not be refused by the gate.
        self.client().reset_logged_out();

        match self.service.login(email, password).await {
            Ok((user, tokens)) => {
                self.client()
                    .set_access_token(Some(tokens.access_token.clone()));
                self.client().reset_logged_out();
                tracing::info!(user = %user.email, "login succeeded");
                self.update(|s| {
                    s.phase = AuthPhase::Authenticated;
                    s.user = Some(user.clone());
                    s.tokens = Some(tokens);
                    s.error = None;
                });
                self.navigator.navigate(ROOT_PATH);
                Ok(user)
            }
            Err(err) => {
                self.client().set_logged_out();
                tracing::warn!(error = %err, "login failed");
                self.update(|s| {
                    s.phase = AuthPhase::Anonymous;
                    s.user = None;
                    s.tokens = None;
                    s.error = Some(err.user_message());
                });
                Err(err)
            }
        }
    }

    /// Always ends logged out locally, whatever the backend says.
    pub async fn logout(&self) {
        // Close the gate first so nothing races ahead of the logout.
        self.client().set_logged_out();
        self.update(|s| s.phase = AuthPhase::LoggingOut);

        let outcome = self.service.logout().await;
        self.client().set_access_token(None);
        self.update(|s| {
            s.phase = AuthPhase::Anonymous;
            s.user = None;
            s.tokens = None;
            s.error = outcome.as_ref().err().map(ApiError::user_message);
        });
        if let Err(err) = outcome {
            tracing::warn!(error = %err, "logout completed locally with errors");
        }
        self.navigator.navigate(LOGIN_PATH);
    }

    /// Side channel: the current session is left as it is.
    pub async fn register(&self, req: &RegisterRequest) -> Result<UserProfile, ApiError> {
        match self.service.register(req).await {
            Ok(user) => {
                self.update(|s| s.error = None);
                self.navigator.navigate(LOGIN_PATH);
                Ok(user)
            }
            Err(err) => {
                self.update(|s| s.error = Some(err.user_message()));
                Err(err)
            }
        }
    }

    /// Converges on a refresh outcome reported by the client.
    pub fn apply_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::TokenRefreshed { access_token } => {
                self.update(|s| {
                    if s.phase == AuthPhase::Authenticated {
                        s.tokens = Some(SessionTokens::access_only(access_token.clone()));
                    }
                });
            }
            SessionEvent::RefreshFailed { reason } => {
                let was_authenticated = self.state.borrow().is_authenticated();
                self.client().set_logged_out();
                self.client().set_access_token(None);
                self.update(|s| {
                    s.phase = AuthPhase::Anonymous;
                    s.user = None;
                    s.tokens = None;
                    s.error = Some(format!("session expired: {}", reason));
                });
                if was_authenticated {
                    tracing::info!("session expired; returning to login");
                    self.navigator.navigate(LOGIN_PATH);
                }
            }
        }
    }

    /// Follows the client's refresh outcomes until the controller is dropped
    /// or the client goes away.
    pub fn listen(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let mut events = self.client().subscribe();
        let controller: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let Some(controller) = controller.upgrade() else {
                            break;
                        };
                        controller.apply_event(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
