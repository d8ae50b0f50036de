use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::session::store::{SessionStore, SessionStoreError, TokenPair};
use crate::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// In-memory implementation of SessionStore
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a session
    pub fn with_tokens(tokens: &TokenPair) -> Self {
        let store = Self::new();
        {
            let mut values = store.values.write().unwrap_or_else(|e| e.into_inner());
            values.insert(ACCESS_TOKEN_KEY.to_string(), tokens.access_token.clone());
            values.insert(REFRESH_TOKEN_KEY.to_string(), tokens.refresh_token.clone());
        }
        store
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let values = self.values.read().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        let mut values = self.values.write().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        values.insert(key.to_string(), value.to_string());
        debug!("Stored session key: {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut values = self.values.write().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        if values.remove(key).is_some() {
            debug!("Removed session key: {}", key);
        }
        Ok(())
    }

    // The pair is read and written under one lock so it never mixes two refreshes.
    fn tokens(&self) -> Result<Option<TokenPair>, SessionStoreError> {
        let values = self.values.read().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(pair_from(&values))
    }

    fn store_tokens(&self, tokens: &TokenPair) -> Result<(), SessionStoreError> {
        let mut values = self.values.write().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        values.insert(ACCESS_TOKEN_KEY.to_string(), tokens.access_token.clone());
        values.insert(REFRESH_TOKEN_KEY.to_string(), tokens.refresh_token.clone());
        debug!("Stored token pair");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let mut values = self.values.write().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        values.remove(ACCESS_TOKEN_KEY);
        values.remove(REFRESH_TOKEN_KEY);
        debug!("Cleared session");
        Ok(())
    }
}

fn pair_from(values: &HashMap<String, String>) -> Option<TokenPair> {
    match (values.get(ACCESS_TOKEN_KEY), values.get(REFRESH_TOKEN_KEY)) {
        (Some(access), Some(refresh)) => Some(TokenPair::new(access.as_str(), refresh.as_str())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_store_and_read_back() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.tokens().unwrap(), None);

        store.store_tokens(&TokenPair::new("A", "B")).unwrap();
        assert_eq!(store.tokens().unwrap(), Some(TokenPair::new("A", "B")));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("B"));
    }

    #[test]
    fn test_partial_session_is_not_a_pair() {
        let store = InMemorySessionStore::with_tokens(&TokenPair::new("A", "B"));
        store.remove(REFRESH_TOKEN_KEY).unwrap();

        assert_eq!(store.tokens().unwrap(), None);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A"));
    }

    #[test]
    fn test_clear() {
        let store = InMemorySessionStore::with_tokens(&TokenPair::new("A", "B"));
        store.clear().unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);

        // Clearing an empty store is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_pair_is_never_mixed_under_concurrent_writes() {
        let store = InMemorySessionStore::with_tokens(&TokenPair::new("access-a", "refresh-a"));
        let a = TokenPair::new("access-a", "refresh-a");
        let b = TokenPair::new("access-b", "refresh-b");

        thread::scope(|scope| {
            for pair in [&a, &b] {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..5_000 {
                        store.store_tokens(pair).unwrap();
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..5_000 {
                    let read = store.tokens().unwrap().unwrap();
                    assert!(read == a || read == b, "mixed pair: {:?}", read);
                }
            });
        });

        let last = store.tokens().unwrap().unwrap();
        assert!(last == a || last == b);
    }
}
