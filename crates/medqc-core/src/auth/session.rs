use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::storage::SessionStorage;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "access_token";

/// Storage key holding the JSON-encoded user record
pub const USER_KEY: &str = "user_info";

/// User record returned by the login endpoint.
/// Unknown fields are kept so the record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserInfo {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            role: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Name to show in the shell prompt
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Token and user info for the current session.
///
/// Only the token grants access. A `user_info` entry left behind without a
/// token is ignored by every caller that checks authentication.
///
/// Clone is cheap and all clones share the same backend.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    generation: Arc<AtomicU64>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the bearer token if a session exists
    pub fn token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Get the stored user record. A record that fails to parse reads as absent.
    pub fn user(&self) -> Option<UserInfo> {
        let raw = self.storage.get_item(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed stored user record");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a new session. Writes that the backend rejects are dropped.
    pub fn set_session(&self, token: &str, user: &UserInfo) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = self.storage.set_item(TOKEN_KEY, token) {
            warn!(error = %e, "Dropping session token write");
        }
        match serde_json::to_string(user) {
            Ok(json) => {
                if let Err(e) = self.storage.set_item(USER_KEY, &json) {
                    warn!(error = %e, "Dropping user record write");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode user record"),
        }
        info!(username = %user.username, "Session started");
    }

    /// Remove token and user record. Safe to call on an empty store.
    pub fn clear_session(&self) {
        let had_token = self.token().is_some();
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                warn!(key, error = %e, "Failed to clear session key");
            }
        }
        if had_token {
            info!("Session cleared");
        } else {
            debug!("Session already empty");
        }
    }

    /// Incremented by every `set_session`; identifies the login a token came from.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("generation", &self.generation())
            .finish()
    }
}
