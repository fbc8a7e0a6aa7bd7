//! Single-slot bearer credential storage.
//!
//! The console holds at most one API key at a time. It is written by an
//! explicit login or recovery, read by every outbound request, and removed
//! on logout or when any request comes back 401.
//!
//! Two backings are provided:
//! - [`MemoryStore`]: process-local, for tests and embedding
//! - [`FileStore`]: one file under the user's config directory, the
//!   durable equivalent of browser-local storage

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// Fixed storage key (file name for [`FileStore`]).
pub const STORAGE_KEY: &str = "onceonly_api_key";

/// Storage for the single bearer token.
///
/// `set` trims its input. An empty token reads back as `None`.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    fn get(&self) -> Option<String>;

    fn set(&self, token: &str) -> ClientResult<()>;

    fn clear(&self) -> ClientResult<()>;

    fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

fn non_empty(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// In-memory credential slot.
#[derive(Default)]
pub struct MemoryStore {
    slot: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl AsRef<str>) -> Self {
        Self {
            slot: RwLock::new(non_empty(token.as_ref())),
        }
    }
}

// Never print the token.
impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Option<String> {
        match self.slot.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, token: &str) -> ClientResult<()> {
        let mut slot = self.slot.write().map_err(|_| ClientError::Credentials {
            message: "credential slot poisoned".to_string(),
        })?;
        *slot = non_empty(token);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut slot = self.slot.write().map_err(|_| ClientError::Credentials {
            message: "credential slot poisoned".to_string(),
        })?;
        *slot = None;
        Ok(())
    }
}

/// File-backed credential slot.
///
/// Default location: `{config_dir}/onceonly/onceonly_api_key`
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store at the default location.
    pub fn new() -> ClientResult<Self> {
        let dir = dirs::config_dir().ok_or_else(|| ClientError::Config {
            message: "could not determine config directory".to_string(),
        })?;
        Ok(Self::with_path(dir.join("onceonly").join(STORAGE_KEY)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(unix)]
    fn restrict_permissions(&self) -> ClientResult<()> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn restrict_permissions(&self) -> ClientResult<()> {
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => non_empty(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read credential file");
                None
            }
        }
    }

    fn set(&self, token: &str) -> ClientResult<()> {
        let Some(token) = non_empty(token) else {
            return self.clear();
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.as_bytes())?;
        self.restrict_permissions()?;

        debug!(path = %self.path.display(), "stored credential");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed credential");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
