use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key of the short-lived bearer credential
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key of the credential exchanged for a new pair
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Error type for session store operations
#[derive(Error, Debug)]
pub enum SessionStoreError {
    /// Error occurred during a store operation
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Access/refresh token pair as issued by `/auth/login` and `/auth/refresh`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens stay out of logs.
impl Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Synchronous key/value storage for the session tokens.
///
/// Reads and writes are unsynchronized with respect to in-flight requests:
/// concurrent writers race and the last one wins. The pair methods fall back
/// to per-key calls; adapters shared between tasks override them so a pair is
/// always read and written as a unit.
pub trait SessionStore: Send + Sync + Debug {
    /// Get a value by key
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Set a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError>;

    /// Remove a value; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), SessionStoreError>;

    /// Both tokens, if both are present
    fn tokens(&self) -> Result<Option<TokenPair>, SessionStoreError> {
        let access = self.get(ACCESS_TOKEN_KEY)?;
        let refresh = self.get(REFRESH_TOKEN_KEY)?;
        Ok(match (access, refresh) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
            _ => None,
        })
    }

    fn store_tokens(&self, tokens: &TokenPair) -> Result<(), SessionStoreError> {
        self.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)
    }

    /// Destroy the session
    fn clear(&self) -> Result<(), SessionStoreError> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)
    }
}

/// Type alias for Arc-wrapped SessionStore trait objects
pub type SessionStoreRef = Arc<dyn SessionStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_debug_is_redacted() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let printed = format!("{:?}", pair);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_token_pair_wire_format() {
        let pair: TokenPair = serde_json::from_str(
            r#"{"access_token":"A","refresh_token":"B","token_type":"bearer"}"#,
        )
        .unwrap();
        assert_eq!(pair, TokenPair::new("A", "B"));
    }
}
