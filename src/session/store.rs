use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;

use super::{SessionError, SessionToken, StoredToken, TokenStore};

/// Process-local store; the token lives as long as the store does.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<StoredToken>>,
}

impl TokenStore for MemoryTokenStore {
    fn issue(&self, token: SessionToken) -> Result<(), SessionError> {
        let mut slot = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(StoredToken::issue(token, Utc::now()));
        Ok(())
    }

    fn revoke(&self) -> Result<(), SessionError> {
        let mut slot = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
        Ok(())
    }

    fn read(&self) -> Option<SessionToken> {
        let slot = self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.as_ref()
            .filter(|stored| stored.is_live(Utc::now()))
            .map(|stored| stored.token.clone())
    }
}

/// JSON file holding the current token, the CLI's equivalent of a cookie jar.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full record including expiry, for status displays.
    pub fn load(&self) -> Option<StoredToken> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<StoredToken>(&content) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!("Ignoring malformed session file {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn issue(&self, token: SessionToken) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&StoredToken::issue(token, Utc::now()))?;
        write_private(&self.path, content.as_bytes())?;
        Ok(())
    }

    fn revoke(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read(&self) -> Option<SessionToken> {
        self.load()
            .filter(|stored| stored.is_live(Utc::now()))
            .map(|stored| stored.token)
    }
}

/// Write `content` readable by the owner only.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn memory_store_round_trip_and_idempotent_revoke() {
        let store = MemoryTokenStore::default();
        assert!(store.read().is_none());
        store.revoke().unwrap();

        store.issue(SessionToken::new("abc").unwrap()).unwrap();
        assert_eq!(store.read().unwrap().as_str(), "abc");

        store.issue(SessionToken::new("def").unwrap()).unwrap();
        assert_eq!(store.read().unwrap().as_str(), "def");

        store.revoke().unwrap();
        store.revoke().unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileTokenStore::new(&path).issue(SessionToken::new("abc").unwrap()).unwrap();
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.read().unwrap().as_str(), "abc");

        reopened.revoke().unwrap();
        assert!(!path.exists());
        reopened.revoke().unwrap();
        assert!(reopened.read().is_none());
    }

    #[test]
    fn file_store_treats_expired_or_garbage_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::new(&path);

        let expired = StoredToken::issue(SessionToken::new("old").unwrap(), Utc::now() - Duration::hours(11));
        fs::write(&path, serde_json::to_string(&expired).unwrap()).unwrap();
        assert!(store.read().is_none());
        assert!(store.load().is_some());

        fs::write(&path, "not json").unwrap();
        assert!(store.read().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_readable_by_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileTokenStore::new(&path).issue(SessionToken::new("abc").unwrap()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
