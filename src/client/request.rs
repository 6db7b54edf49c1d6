use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use super::error::{ApiError, error_message};

/// Per-request knobs; the `config` argument of a request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// Surface a 401 verbatim instead of starting a token refresh.
    pub skip_refresh: bool,

    /// Send even while the logged-out gate is closed (no token is attached then).
    pub allow_logged_out: bool,

    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options for the `/auth/*` endpoints.
    pub fn auth_endpoint() -> Self {
        Self {
            skip_refresh: true,
            allow_logged_out: true,
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// A captured outbound request that can be sent again after a refresh.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub options: RequestOptions,
    pub(crate) retry: bool,
}

impl PreparedRequest {
    pub fn new(
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Self {
        Self {
            method,
            path: path.to_string(),
            body,
            options,
            retry: false,
        }
    }

    pub fn is_retry(&self) -> bool {
        self.retry
    }

    pub(crate) fn transport_error(&self, err: reqwest::Error) -> ApiError {
        ApiError::Transport {
            method: self.method.to_string(),
            path: self.path.clone(),
            message: err.to_string(),
        }
    }

    /// Turns a non-2xx response into `ApiError::Status`.
    pub(crate) fn finish(&self, resp: ApiResponse) -> Result<ApiResponse, ApiError> {
        if resp.is_success() {
            return Ok(resp);
        }
        let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Err(ApiError::Status {
            method: self.method.to_string(),
            path: self.path.clone(),
            status: resp.status,
            message: error_message(&resp.body, status),
        })
    }
}

/// A fully read response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|err| ApiError::decode("response body", err))
    }

    /// Body as loose JSON; an empty body reads as `null`.
    pub fn value(&self) -> Result<serde_json::Value, ApiError> {
        if self.body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        self.json()
    }
}
