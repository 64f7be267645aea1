//! Credential error types

use crate::store::StoreStatus;
use thiserror::Error;

/// Credential lifecycle errors
///
/// Store-level failures keep the status the secure store reported so callers
/// can tell a duplicate insert from a locked keychain.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The store rejected an insert (for example, the item already exists)
    #[error("Failed to add credential: {0}")]
    Add(StoreStatus),

    /// The store rejected a lookup, or nothing matched
    #[error("Failed to copy credential: {0}")]
    Copy(StoreStatus),

    /// The store rejected a delete for a reason other than absence
    #[error("Failed to delete credential: {0}")]
    Delete(StoreStatus),

    /// Lookup succeeded but the item is not a complete credential
    #[error("Secure store returned an item that is not a complete credential")]
    UnknownResult,

    /// Password bytes are not valid UTF-8
    #[error("Password could not be encoded as UTF-8")]
    Encoding,

    /// Credential fields failed validation before reaching the store
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CredentialError {
    /// Status reported by the store, if this error came from one
    #[must_use]
    pub fn status(&self) -> Option<StoreStatus> {
        match self {
            Self::Add(status) | Self::Copy(status) | Self::Delete(status) => Some(*status),
            _ => None,
        }
    }

    /// True when a lookup failed only because nothing matched
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Copy(status) if *status == StoreStatus::ITEM_NOT_FOUND)
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidCredential(reason.into())
    }
}

/// Result type for credential operations
pub type Result<T> = std::result::Result<T, CredentialError>;
