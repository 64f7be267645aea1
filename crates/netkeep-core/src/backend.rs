//! Store backend selection

use crate::error::{CredentialError, Result};
use crate::store::{EncryptedFileStore, KeychainStore, MemoryStore, SecureStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Supported secure-store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Automatic selection based on platform
    #[default]
    Auto,
    /// macOS Keychain
    Keychain,
    /// Encrypted file fallback
    EncryptedFile,
    /// In-memory only (for testing)
    Memory,
}

impl StoreBackend {
    /// Detect the best backend for the current platform
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::Keychain
        }
        #[cfg(not(target_os = "macos"))]
        {
            Self::EncryptedFile
        }
    }

    /// Resolve Auto to actual backend
    #[must_use]
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => Self::detect(),
            other => other,
        }
    }

    /// Open the resolved backend
    ///
    /// `path` is the keychain file for [`StoreBackend::Keychain`] and the item
    /// file for [`StoreBackend::EncryptedFile`]; both fall back to their
    /// defaults when `None`.
    pub fn open(self, path: Option<PathBuf>) -> Result<Box<dyn SecureStore>> {
        let resolved = self.resolve();
        info!(backend = ?resolved, path = ?path, "Opening secure store");

        let store: Box<dyn SecureStore> = match resolved {
            Self::Keychain => match path {
                Some(path) => Box::new(KeychainStore::with_keychain(path)),
                None => Box::new(KeychainStore::new()),
            },
            Self::EncryptedFile => Box::new(EncryptedFileStore::from_env(path)?),
            Self::Memory => Box::new(MemoryStore::new()),
            Self::Auto => {
                // Should never happen after resolve()
                return Err(CredentialError::Configuration(
                    "Backend not resolved".to_string(),
                ));
            }
        };
        Ok(store)
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "keychain" => Ok(Self::Keychain),
            "encrypted_file" | "encrypted-file" | "file" => Ok(Self::EncryptedFile),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}
