use reqwest::StatusCode;

/// Failures surfaced by the HTTP client core and the session layer.
///
/// `Clone` so a single refresh failure can be delivered to every request
/// that was queued behind it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The logged-out gate is closed; nothing was sent.
    #[error("user is logged out")]
    LoggedOut,

    #[error("{method} {path} failed with status {status}: {message}")]
    Status {
        method: String,
        path: String,
        status: u16,
        message: String,
    },

    #[error("{method} {path}: {message}")]
    Transport {
        method: String,
        path: String,
        message: String,
    },

    #[error("invalid token response format")]
    InvalidTokenResponse,

    #[error("decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("no token refresher is installed")]
    RefreshUnavailable,

    #[error("request was abandoned before the in-flight refresh settled")]
    Cancelled,

    #[error("credential storage: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Short text suitable for an inline error field.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn storage(err: anyhow::Error) -> Self {
        ApiError::Storage(format!("{:#}", err))
    }

    pub(crate) fn decode(what: &str, err: impl std::fmt::Display) -> Self {
        ApiError::Decode {
            what: what.to_string(),
            message: err.to_string(),
        }
    }
}

/// Prefers the backend's `message`, then `error`, then the status reason.
pub(crate) fn error_message(body: &[u8], status: StatusCode) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|x| x.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
