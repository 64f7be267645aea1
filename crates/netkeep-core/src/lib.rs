//! Netkeep Core - network credential storage
//!
//! Keeps username/password/URL records for network services in a platform
//! secure store that speaks an attribute-query protocol:
//! - Query builder: credential fields to and from store attributes
//! - Store adapter: add / copy-matching / delete with typed errors
//! - Credential manager: set, get, replace and delete
//!
//! ## Backends
//!
//! - macOS Keychain (via the `security` tool)
//! - Encrypted file (AES-256-GCM)
//! - In-memory (testing)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod attributes;
pub mod backend;
pub mod config;
pub mod credential;
pub mod error;
pub mod manager;
pub mod query;
pub mod secure_string;
pub mod store;

pub use adapter::StoreAdapter;
pub use attributes::{Accessibility, AttrKey, AttrValue, AttributeMap, ItemClass, ItemQuery, Protocol};
pub use backend::StoreBackend;
pub use config::ManagerConfig;
pub use credential::{Credential, CredentialQuery};
pub use error::{CredentialError, Result};
pub use manager::CredentialManager;
pub use secure_string::{SecretBytes, SecureString};
pub use store::{EncryptedFileStore, KeychainStore, MemoryStore, SecureStore, StoreStatus};

// Re-exported so callers can build URLs without a direct dependency
pub use url::Url;
