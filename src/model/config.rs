use serde::{Deserialize, Serialize};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,

    /// Backend base URL, without a trailing slash (e.g. `http://127.0.0.1:8080/api`).
    pub base_url: String,

    /// Upper bound for a single transport call. A hung refresh is only
    /// drained once this elapses.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            version: 1,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
