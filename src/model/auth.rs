use serde::{Deserialize, Serialize};

/// Session credentials as persisted client-side.
///
/// `refresh_token` is always empty here: the real refresh token travels in an
/// HTTP-only cookie managed by the backend and never reaches this code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,
}

impl SessionTokens {
    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: String::new(),
        }
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,

    /// Primary role label.
    pub role: String,

    /// `resource:action:scope` strings.
    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealership_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `data` payload of a successful `POST /auth/login`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,

    // Some backends echo it; it is never kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    pub user: UserProfile,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_name: String,
    pub dealership_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<String>,
}
