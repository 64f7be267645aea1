//! In-memory secure store (for testing and ephemeral use)

use super::table::ItemTable;
use super::{SecureStore, StoreStatus};
use crate::attributes::AttributeMap;
use std::sync::RwLock;
use tracing::warn;

/// Secure store that keeps items in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<ItemTable>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_poisoned<T>(e: std::sync::PoisonError<T>) -> StoreStatus {
    warn!(error = %e, "Memory store lock poisoned");
    StoreStatus::IO
}

impl SecureStore for MemoryStore {
    fn add(&self, attributes: &AttributeMap) -> Result<(), StoreStatus> {
        self.table.write().map_err(lock_poisoned)?.add(attributes)
    }

    fn copy_matching(&self, query: &AttributeMap) -> Result<AttributeMap, StoreStatus> {
        self.table.read().map_err(lock_poisoned)?.copy_matching(query)
    }

    fn delete(&self, query: &AttributeMap) -> Result<(), StoreStatus> {
        self.table.write().map_err(lock_poisoned)?.delete(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttrKey, AttrValue};
    use std::sync::Arc;

    #[test]
    fn test_poisoned_lock() {
        let store = Arc::new(MemoryStore::new());
        let mut attributes = AttributeMap::new();
        attributes.insert(AttrKey::Class, AttrValue::Text("inet".into()));
        attributes.insert(AttrKey::Account, AttrValue::Text("u1".into()));
        store.add(&attributes).unwrap();

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.table.write().unwrap();
            panic!("poison the table lock");
        })
        .join();

        // Counting still sees the table; verbs report an I/O failure
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        assert_eq!(store.add(&attributes), Err(StoreStatus::IO));
    }
}
