//! Persisted session data: the access token and the signed-in user's profile.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::model::{SessionTokens, UserProfile};
use crate::store::{KeyValueStorage, MemoryStorage};

pub const AUTH_TOKENS_KEY: &str = "auth_tokens";
pub const AUTH_USER_KEY: &str = "auth_user";

#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Writes tokens and user as one unit.
    pub fn save_session(&self, tokens: &SessionTokens, user: &UserProfile) -> Result<()> {
        let tokens_json = serde_json::to_string(tokens).context("serialize tokens")?;
        let user_json = serde_json::to_string(user).context("serialize user")?;
        self.storage
            .set_many(&[(AUTH_TOKENS_KEY, tokens_json), (AUTH_USER_KEY, user_json)])
            .context("persist session")
    }

    pub fn save_tokens(&self, tokens: &SessionTokens) -> Result<()> {
        let tokens_json = serde_json::to_string(tokens).context("serialize tokens")?;
        self.storage
            .set(AUTH_TOKENS_KEY, tokens_json)
            .context("persist tokens")
    }

    pub fn tokens(&self) -> Result<Option<SessionTokens>> {
        self.read_json(AUTH_TOKENS_KEY)
    }

    pub fn user(&self) -> Result<Option<UserProfile>> {
        self.read_json(AUTH_USER_KEY)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage
            .remove_many(&[AUTH_TOKENS_KEY, AUTH_USER_KEY])
            .context("clear session")
    }

    /// Stored values that fail to parse are purged and read as absent.
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.storage.get(key).with_context(|| format!("read {}", key))? else {
            return Ok(None);
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(err) => {
                tracing::warn!(key, error = %err, "purging corrupted stored entry");
                self.storage
                    .remove(key)
                    .with_context(|| format!("purge corrupted {}", key))?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
