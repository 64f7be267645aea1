//! Secure store adapter
//!
//! Runs one store verb per call and turns the store's status into a
//! [`CredentialError`]. No retries.

use crate::attributes::{AttributeMap, ItemQuery};
use crate::error::{CredentialError, Result};
use crate::store::{SecureStore, StoreStatus};

/// Typed front for a [`SecureStore`]
#[derive(Debug)]
pub struct StoreAdapter<S> {
    store: S,
}

impl<S: SecureStore> StoreAdapter<S> {
    /// Wrap a store
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The wrapped store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a new item; any failure is [`CredentialError::Add`]
    pub fn insert(&self, query: &ItemQuery) -> Result<()> {
        self.store
            .add(&query.to_attributes())
            .map_err(CredentialError::Add)
    }

    /// Fetch at most one matching item with its payload and attributes
    ///
    /// Any failure, including no match, is [`CredentialError::Copy`].
    pub fn lookup(&self, query: &ItemQuery) -> Result<AttributeMap> {
        let query = ItemQuery {
            return_data: true,
            return_attributes: true,
            match_one: true,
            ..query.clone()
        };

        self.store
            .copy_matching(&query.to_attributes())
            .map_err(CredentialError::Copy)
    }

    /// Delete every matching item; deleting nothing is not an error
    pub fn remove(&self, query: &ItemQuery) -> Result<()> {
        match self.store.delete(&query.to_attributes()) {
            Ok(()) | Err(StoreStatus::ITEM_NOT_FOUND) => Ok(()),
            Err(status) => Err(CredentialError::Delete(status)),
        }
    }
}
