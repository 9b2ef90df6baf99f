//! Bearer token storage.
//!
//! [`TokenStore`] is the seam where a platform secure-storage mechanism
//! plugs in. The file-backed implementation stands in for it here; the
//! in-memory one backs tests.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ClientError;

pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any. `None` means requests go out
    /// unauthenticated.
    fn load(&self) -> Result<Option<String>, ClientError>;

    fn save(&self, token: &str) -> Result<(), ClientError>;

    fn clear(&self) -> Result<(), ClientError>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.token.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        *self.token.lock().map_err(poisoned)? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.token.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> ClientError {
    ClientError::TokenStore("token store lock poisoned".to_string())
}

// ============================================================================
// FILE-BACKED STORE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedToken {
    token: String,
}

/// Stores the token as a small JSON file.
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
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::TokenStore(e.to_string()))?;
        let persisted: PersistedToken = serde_json::from_str(&contents)?;
        Ok(Some(persisted.token))
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::TokenStore(e.to_string()))?;
        }
        let contents = serde_json::to_string_pretty(&PersistedToken {
            token: token.to_string(),
        })?;
        std::fs::write(&self.path, contents)
            .map_err(|e| ClientError::TokenStore(e.to_string()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| ClientError::TokenStore(e.to_string()))?;
        }
        Ok(())
    }
}
