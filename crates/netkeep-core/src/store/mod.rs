//! Secure-store protocol
//!
//! A secure store answers three verbs over an [`AttributeMap`]: add,
//! copy-matching and delete. Outcomes are reported as a [`StoreStatus`], the
//! numeric code family used by platform keychains.

mod encrypted_file;
mod keychain;
mod memory;
mod table;


pub use encrypted_file::EncryptedFileStore;
pub use keychain::KeychainStore;
pub use memory::MemoryStore;

use crate::attributes::AttributeMap;
use std::sync::Arc;

/// Numeric status reported by a secure store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreStatus(
    /// Raw code
    pub i32,
);

impl StoreStatus {
    /// Success
    pub const SUCCESS: Self = Self(0);
    /// Function or operation not implemented
    pub const UNIMPLEMENTED: Self = Self(-4);
    /// I/O error
    pub const IO: Self = Self(-36);
    /// One or more parameters were invalid
    pub const PARAM: Self = Self(-50);
    /// Authentication failed (wrong key, locked store)
    pub const AUTH_FAILED: Self = Self(-25293);
    /// An item with the same primary key already exists
    pub const DUPLICATE_ITEM: Self = Self(-25299);
    /// No item matched
    pub const ITEM_NOT_FOUND: Self = Self(-25300);
    /// Stored data could not be decoded
    pub const DECODE: Self = Self(-26275);

    /// Raw numeric code
    #[must_use]
    pub fn code(self) -> i32 {
        self.0
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::SUCCESS => "success",
            Self::UNIMPLEMENTED => "unimplemented",
            Self::IO => "I/O error",
            Self::PARAM => "invalid parameter",
            Self::AUTH_FAILED => "authentication failed",
            Self::DUPLICATE_ITEM => "duplicate item",
            Self::ITEM_NOT_FOUND => "item not found",
            Self::DECODE => "decode error",
            _ => return None,
        })
    }
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "status {}", self.0),
        }
    }
}

/// Platform secure store
///
/// Implementations perform one synchronous call per verb and never retry.
/// `Err` never carries [`StoreStatus::SUCCESS`].
#[cfg_attr(test, mockall::automock)]
pub trait SecureStore: Send + Sync {
    /// Add a new item described by `attributes`
    fn add(&self, attributes: &AttributeMap) -> Result<(), StoreStatus>;

    /// Return the first item matching `query`, shaped by its return flags
    fn copy_matching(&self, query: &AttributeMap) -> Result<AttributeMap, StoreStatus>;

    /// Delete every item matching `query`
    fn delete(&self, query: &AttributeMap) -> Result<(), StoreStatus>;
}

impl<S: SecureStore + ?Sized> SecureStore for Box<S> {
    fn add(&self, attributes: &AttributeMap) -> Result<(), StoreStatus> {
        (**self).add(attributes)
    }

    fn copy_matching(&self, query: &AttributeMap) -> Result<AttributeMap, StoreStatus> {
        (**self).copy_matching(query)
    }

    fn delete(&self, query: &AttributeMap) -> Result<(), StoreStatus> {
        (**self).delete(query)
    }
}

impl<S: SecureStore + ?Sized> SecureStore for Arc<S> {
    fn add(&self, attributes: &AttributeMap) -> Result<(), StoreStatus> {
        (**self).add(attributes)
    }

    fn copy_matching(&self, query: &AttributeMap) -> Result<AttributeMap, StoreStatus> {
        (**self).copy_matching(query)
    }

    fn delete(&self, query: &AttributeMap) -> Result<(), StoreStatus> {
        (**self).delete(query)
    }
}
