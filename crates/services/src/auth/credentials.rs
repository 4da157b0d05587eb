use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Refresh material that lets a returning user skip the sign-in screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub uid: String,
    pub refresh_token: String,
}

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredCredential>, AuthError>;
    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// JSON file holding a single [`StoredCredential`].
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `credentials.json` under the platform data directory.
    pub fn in_default_location() -> Result<Self, AuthError> {
        let dirs = ProjectDirs::from("app", "homebase", "homebase").ok_or_else(|| {
            AuthError::Credentials("no home directory for credential storage".to_string())
        })?;
        Ok(Self::new(dirs.data_dir().join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>, AuthError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::Credentials(e.to_string())),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| AuthError::Credentials(format!("{}: {e}", self.path.display())))
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AuthError::Credentials(e.to_string()))?;
        }
        let raw = serde_json::to_vec_pretty(credential)
            .map_err(|e| AuthError::Credentials(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| AuthError::Credentials(e.to_string()))
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Credentials(e.to_string())),
        }
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<StoredCredential>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>, AuthError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError> {
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
