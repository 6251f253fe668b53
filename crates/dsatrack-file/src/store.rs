//! Filesystem storage for the credential pair.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use fs2::FileExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use dsatrack_core::error::{Error, StorageError};
use dsatrack_core::{AccessToken, CredentialStore, RefreshToken, Result, StoredTokens, TokenUpdate};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn map_io(path: &Path, err: io::Error) -> Error {
    Error::Storage(StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// A credential store persisted as a small JSON file.
///
/// The file holds `{"access": "...", "refresh": "..."}`; either key may be
/// missing. The pair is loaded once on [`FileStore::open`] and every update is
/// written through to disk with a temp-file-and-rename, so a crash never
/// leaves a half-written file behind.
///
/// Write failures are logged and do not fail the operation: the in-memory
/// view stays authoritative for the running process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tokens: RwLock<StoredTokens>,
}

impl FileStore {
    /// Open the store at `path`, loading any previously persisted pair.
    ///
    /// A missing file yields an empty store. The parent directory is created
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| map_io(parent, e))?;
        }

        let tokens = match fs::read_to_string(&path) {
            Ok(json) if json.trim().is_empty() => StoredTokens::default(),
            Ok(json) => serde_json::from_str(&json).map_err(|e| {
                Error::Storage(StorageError::Corrupt {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoredTokens::default(),
            Err(e) => return Err(map_io(&path, e)),
        };

        debug!(
            access = tokens.access.is_some(),
            refresh = tokens.refresh.is_some(),
            "Loaded credential file"
        );

        Ok(Self {
            path,
            tokens: RwLock::new(tokens),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, StoredTokens> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoredTokens> {
        self.tokens.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Write `tokens` to disk, or remove the file when the pair is empty.
    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| map_io(&lock_path, e))?;

        lock_file
            .lock_exclusive()
            .map_err(|e| map_io(&lock_path, e))?;

        if tokens.access.is_none() && tokens.refresh.is_none() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(map_io(&self.path, e)),
            };
        }

        let json = serde_json::to_string_pretty(tokens).map_err(|e| {
            Error::Storage(StorageError::Corrupt {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        let result = Self::write_temp(&temp_path, json.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path).map_err(|e| map_io(&self.path, e)));

        if result.is_err() {
            // Don't leave a stray copy of the tokens next to the real file.
            let _ = fs::remove_file(&temp_path);
        }

        result
    }

    fn write_temp(temp_path: &Path, contents: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(temp_path)
            .map_err(|e| map_io(temp_path, e))?;

        // Set restrictive permissions before any secret is written (Unix only)
        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(temp_path, perms).map_err(|e| map_io(temp_path, e))?;
        }

        file.write_all(contents)
            .and_then(|_| file.sync_all())
            .map_err(|e| map_io(temp_path, e))
    }
}

impl CredentialStore for FileStore {
    fn access(&self) -> Option<AccessToken> {
        self.read().access_token()
    }

    fn refresh(&self) -> Option<RefreshToken> {
        self.read().refresh_token()
    }

    fn set_tokens(&self, update: TokenUpdate) {
        if update.is_empty() {
            return;
        }

        let mut tokens = self.write();
        tokens.apply(update);
        if let Err(e) = self.persist(&tokens) {
            warn!(error = %e, "Failed to persist credentials");
        }
    }

    fn clear_tokens(&self) {
        let mut tokens = self.write();
        tokens.clear();
        if let Err(e) = self.persist(&tokens) {
            warn!(error = %e, "Failed to remove persisted credentials");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::open(dir.path().join("session.json")).unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.access().is_none());
        assert!(store.refresh().is_none());
    }

    #[test]
    fn tokens_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_tokens(TokenUpdate::pair(
            AccessToken::new("A1"),
            RefreshToken::new("R1"),
        ));
        drop(store);

        let reopened = store_in(&dir);
        assert_eq!(reopened.access(), Some(AccessToken::new("A1")));
        assert_eq!(reopened.refresh(), Some(RefreshToken::new("R1")));
    }

    #[test]
    fn partial_update_is_persisted_without_losing_refresh() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_tokens(TokenUpdate::pair(
            AccessToken::new("A1"),
            RefreshToken::new("R1"),
        ));
        store.set_tokens(TokenUpdate::access(AccessToken::new("A2")));

        let reopened = store_in(&dir);
        assert_eq!(reopened.access(), Some(AccessToken::new("A2")));
        assert_eq!(reopened.refresh(), Some(RefreshToken::new("R1")));
    }

    #[test]
    fn file_uses_access_and_refresh_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_tokens(TokenUpdate::pair(
            AccessToken::new("A1"),
            RefreshToken::new("R1"),
        ));

        let json = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["access"], "A1");
        assert_eq!(value["refresh"], "R1");
    }

    #[test]
    fn clear_removes_file_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_tokens(TokenUpdate::pair(
            AccessToken::new("A1"),
            RefreshToken::new("R1"),
        ));

        store.clear_tokens();
        assert!(!store.path().exists());
        assert!(store.access().is_none());

        store.clear_tokens();
        assert!(store.access().is_none());
        assert!(store.refresh().is_none());
        assert!(store_in(&dir).access().is_none());
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        // A non-empty directory in place of the file makes the rename fail.
        let path = dir.path().join("session.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        store.set_tokens(TokenUpdate::pair(
            AccessToken::new("A1"),
            RefreshToken::new("R1"),
        ));

        // The in-memory view still carries the update.
        assert_eq!(store.access(), Some(AccessToken::new("A1")));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "stray temp files: {leftovers:?}");
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_tokens(TokenUpdate::access(AccessToken::new("A1")));

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
