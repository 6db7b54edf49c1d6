use std::sync::Arc;

use reqwest::Method;

use crate::client::{ApiClient, ApiError, RequestOptions, TokenRefresher};
use crate::credentials::CredentialStore;
use crate::endpoints;
use crate::model::{
    Envelope, LoginData, LoginRequest, RegisterRequest, SessionTokens, UserProfile,
};

/// Talks to the `/auth/*` endpoints and keeps persisted credentials in step.
///
/// Holds no session state of its own beyond what the credential store has.
pub struct SessionService {
    client: ApiClient,
    credentials: CredentialStore,
}

impl SessionService {
    /// Builds the service and installs it as the client's token refresher.
    pub fn attach(client: ApiClient, credentials: CredentialStore) -> Arc<Self> {
        let service = Arc::new(Self {
            client,
            credentials,
        });
        let refresher: Arc<dyn TokenRefresher> = service.clone();
        service.client.set_refresher(&refresher);
        service
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Persists the user and an access-token-only token pair.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserProfile, SessionTokens), ApiError> {
        tracing::debug!(email, "logging in");
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: Envelope<LoginData> = self
            .client
            .send_json(
                Method::POST,
                endpoints::AUTH_LOGIN,
                &body,
                RequestOptions::auth_endpoint(),
            )
            .await?;

        let LoginData {
            access_token, user, ..
        } = resp.data;
        let tokens = SessionTokens::access_only(access_token);
        self.credentials
            .save_session(&tokens, &user)
            .map_err(ApiError::storage)?;
        Ok((user, tokens))
    }

    /// Any failure here invalidates the local session.
    pub async fn refresh(&self) -> Result<SessionTokens, ApiError> {
        match self.request_refresh().await {
            Ok(tokens) => Ok(tokens),
            Err(err) => {
                if let Err(clear_err) = self.credentials.clear() {
                    tracing::warn!(error = %format!("{:#}", clear_err), "clear credentials after failed refresh");
                }
                Err(err)
            }
        }
    }

    async fn request_refresh(&self) -> Result<SessionTokens, ApiError> {
        // The refresh token rides in the backend's HTTP-only cookie.
        let resp = self
            .client
            .post(
                endpoints::AUTH_REFRESH_TOKEN,
                None,
                RequestOptions::auth_endpoint(),
            )
            .await?;
        let body = resp.value().map_err(|_| ApiError::InvalidTokenResponse)?;
        let tokens = SessionTokens::access_only(extract_access_token(&body)?);
        self.credentials
            .save_tokens(&tokens)
            .map_err(ApiError::storage)?;
        Ok(tokens)
    }

    /// Best-effort remote logout; local credentials are cleared regardless.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Err(err) = self
            .client
            .post(endpoints::AUTH_LOGOUT, None, RequestOptions::auth_endpoint())
            .await
        {
            tracing::warn!(error = %err, "logout request failed; clearing local session anyway");
        }
        self.credentials.clear().map_err(ApiError::storage)
    }

    /// Creates an account. The current session is not touched.
    pub async fn register(&self, req: &RegisterRequest) -> Result<UserProfile, ApiError> {
        let resp: Envelope<UserProfile> = self
            .client
            .send_json(
                Method::POST,
                endpoints::AUTH_REGISTER,
                req,
                RequestOptions::auth_endpoint(),
            )
            .await?;
        Ok(resp.data)
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.credentials.user().unwrap_or_else(|err| {
            tracing::warn!(error = %format!("{:#}", err), "read stored user");
            None
        })
    }

    pub fn tokens(&self) -> Option<SessionTokens> {
        self.credentials.tokens().unwrap_or_else(|err| {
            tracing::warn!(error = %format!("{:#}", err), "read stored tokens");
            None
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_some_and(|t| t.has_access_token())
    }
}

#[async_trait::async_trait]
impl TokenRefresher for SessionService {
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        self.refresh().await.map(|tokens| tokens.access_token)
    }
}

/// Canonical shape is `{ data: { accessToken } }`; a bare `{ accessToken }`
/// is still accepted from older backends.
pub(crate) fn extract_access_token(body: &serde_json::Value) -> Result<String, ApiError> {
    let token_at = |v: Option<&serde_json::Value>| {
        v.and_then(|x| x.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(token) = token_at(body.get("data").and_then(|d| d.get("accessToken"))) {
        return Ok(token);
    }
    if let Some(token) = token_at(body.get("accessToken")) {
        tracing::warn!("refresh response used the deprecated flat shape");
        return Ok(token);
    }
    Err(ApiError::InvalidTokenResponse)
}
