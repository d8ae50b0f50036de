use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::session::store::{SessionStore, SessionStoreError, TokenPair};
use crate::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Session store persisted as a flat JSON object on disk.
///
/// Every operation re-reads the file, so several processes sharing one file
/// see each other's writes (last writer wins). The file is deleted once the
/// last key is removed.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SessionStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(SessionStoreError::StorageError(format!(
                    "Failed to read session file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str(&content) {
            Ok(values) => Ok(values),
            Err(e) => {
                // A corrupt file is treated as an empty session rather than a hard failure
                warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), SessionStoreError> {
        if values.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(SessionStoreError::StorageError(format!(
                    "Failed to remove session file {}: {}",
                    self.path.display(),
                    e
                ))),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SessionStoreError::StorageError(format!(
                    "Failed to create session directory: {}",
                    e
                ))
            })?;
        }

        let content = serde_json::to_string_pretty(values).map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to serialize session: {}", e))
        })?;

        // Write a private temp file next to the target, then rename over it
        let temp_path = self
            .path
            .with_extension(format!("tmp-{}", std::process::id()));
        write_private(&temp_path, &content).map_err(|e| {
            SessionStoreError::StorageError(format!(
                "Failed to write session file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            SessionStoreError::StorageError(format!(
                "Failed to replace session file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, SessionStoreError> {
        self.guard.lock().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire session lock: {}", e))
        })
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let _guard = self.lock()?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        let _guard = self.lock()?;
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)?;
        debug!("Stored session key {} in {}", key, self.path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        let _guard = self.lock()?;
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
            debug!("Removed session key {} from {}", key, self.path.display());
        }
        Ok(())
    }

    fn tokens(&self) -> Result<Option<TokenPair>, SessionStoreError> {
        let _guard = self.lock()?;
        let values = self.read_all()?;
        Ok(
            match (values.get(ACCESS_TOKEN_KEY), values.get(REFRESH_TOKEN_KEY)) {
                (Some(access), Some(refresh)) => {
                    Some(TokenPair::new(access.as_str(), refresh.as_str()))
                }
                _ => None,
            },
        )
    }

    // One read-modify-write for both keys, so the file never holds half of a refresh.
    fn store_tokens(&self, tokens: &TokenPair) -> Result<(), SessionStoreError> {
        let _guard = self.lock()?;
        let mut values = self.read_all()?;
        values.insert(ACCESS_TOKEN_KEY.to_string(), tokens.access_token.clone());
        values.insert(REFRESH_TOKEN_KEY.to_string(), tokens.refresh_token.clone());
        self.write_all(&values)?;
        debug!("Stored token pair in {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let _guard = self.lock()?;
        let mut values = self.read_all()?;
        let had_access = values.remove(ACCESS_TOKEN_KEY).is_some();
        let had_refresh = values.remove(REFRESH_TOKEN_KEY).is_some();
        if had_access || had_refresh {
            self.write_all(&values)?;
            debug!("Cleared session in {}", self.path.display());
        }
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let store = FileSessionStore::new(&path);
        store.store_tokens(&TokenPair::new("A", "B")).unwrap();
        assert!(path.exists());

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.tokens().unwrap(), Some(TokenPair::new("A", "B")));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[ACCESS_TOKEN_KEY], "A");
        assert_eq!(raw[REFRESH_TOKEN_KEY], "B");
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::new(&path);
        store.store_tokens(&TokenPair::new("A", "B")).unwrap();
        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert!(path.exists());
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("B"));

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.tokens().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

        store.set(ACCESS_TOKEN_KEY, "fresh").unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        store.store_tokens(&TokenPair::new("A", "B")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // Only the session file remains; the temp file was renamed into place
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_store_tokens_replaces_both_keys_at_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        store.store_tokens(&TokenPair::new("A", "B")).unwrap();

        let other = FileSessionStore::new(&path);
        other.store_tokens(&TokenPair::new("C", "D")).unwrap();

        assert_eq!(store.tokens().unwrap(), Some(TokenPair::new("C", "D")));
    }
}
