//! In-memory credential storage.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::tokens::{AccessToken, RefreshToken, TokenUpdate};
use crate::traits::CredentialStore;

/// The persisted layout of a credential pair: two optional strings keyed
/// `access` and `refresh`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl StoredTokens {
    /// Apply a partial update.
    pub fn apply(&mut self, update: TokenUpdate) {
        if let Some(access) = update.access {
            self.access = Some(access.as_str().to_string());
        }
        if let Some(refresh) = update.refresh {
            self.refresh = Some(refresh.as_str().to_string());
        }
    }

    /// Remove both values.
    pub fn clear(&mut self) {
        self.access = None;
        self.refresh = None;
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.access.as_deref().map(AccessToken::new)
    }

    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.refresh.as_deref().map(RefreshToken::new)
    }
}

impl std::fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTokens")
            .field("access", &self.access.as_ref().map(|_| "[REDACTED]"))
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A credential store that lives only as long as the process.
///
/// Useful for tests and for short-lived tools that log in on every run.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: RwLock<StoredTokens>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given pair.
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens {
                access: access.map(str::to_string),
                refresh: refresh.map(str::to_string),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoredTokens> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoredTokens> {
        self.tokens.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryStore {
    fn access(&self) -> Option<AccessToken> {
        self.read().access_token()
    }

    fn refresh(&self) -> Option<RefreshToken> {
        self.read().refresh_token()
    }

    fn set_tokens(&self, update: TokenUpdate) {
        trace!(
            access = update.access.is_some(),
            refresh = update.refresh.is_some(),
            "storing tokens"
        );
        self.write().apply(update);
    }

    fn clear_tokens(&self) {
        trace!("clearing tokens");
        self.write().clear();
    }
}
