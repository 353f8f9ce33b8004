//! Persistent bearer-token storage.

use super::model::AuthToken;
use crate::error::{ClientError, Result};
use std::sync::{Arc, RwLock};

/// Fixed key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "authToken";

/// Client-local storage for the single bearer credential.
///
/// The token outlives a single run; its absence means an anonymous session.
/// Operations are synchronous so that logout can clear the credential without
/// suspending.
pub trait TokenStore: Send + Sync {
    /// Returns the persisted token, if any.
    fn load(&self) -> Result<Option<AuthToken>>;

    /// Persists `token`, replacing any previous value.
    fn save(&self, token: &AuthToken) -> Result<()>;

    /// Removes the persisted token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// In-process token store that forgets the token at process end.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<RwLock<Option<AuthToken>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`, as if persisted by a prior run.
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthToken>> {
        let guard = self
            .token
            .read()
            .map_err(|e| ClientError::storage(format!("Token lock poisoned: {}", e)))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &AuthToken) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| ClientError::storage(format!("Token lock poisoned: {}", e)))?;
        *guard = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| ClientError::storage(format!("Token lock poisoned: {}", e)))?;
        *guard = None;
        Ok(())
    }
}
