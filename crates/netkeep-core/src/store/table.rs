//! Item table with keychain matching rules, shared by in-process stores

use super::StoreStatus;
use crate::attributes::{flag, AttrKey, AttrValue, AttributeMap};
use serde::{Deserialize, Serialize};

/// Items held by an in-process store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct ItemTable {
    items: Vec<AttributeMap>,
}

impl ItemTable {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn add(&mut self, attributes: &AttributeMap) -> Result<(), StoreStatus> {
        if !attributes.contains_key(&AttrKey::Class) {
            return Err(StoreStatus::PARAM);
        }

        let item: AttributeMap = attributes
            .iter()
            .filter(|(key, _)| key.is_matchable() || stored_payload(**key))
            .map(|(key, value)| (*key, value.clone()))
            .collect();

        if self.items.iter().any(|existing| same_primary_key(existing, &item)) {
            return Err(StoreStatus::DUPLICATE_ITEM);
        }

        self.items.push(item);
        Ok(())
    }

    pub(crate) fn copy_matching(&self, query: &AttributeMap) -> Result<AttributeMap, StoreStatus> {
        let item = self
            .items
            .iter()
            .find(|item| matches(item, query))
            .ok_or(StoreStatus::ITEM_NOT_FOUND)?;

        let want_data = flag(query, AttrKey::ReturnData);
        let want_attributes = flag(query, AttrKey::ReturnAttributes);

        Ok(item
            .iter()
            .filter(|(key, _)| match key {
                AttrKey::ValueData => want_data,
                _ => want_attributes,
            })
            .map(|(key, value)| (*key, value.clone()))
            .collect())
    }

    pub(crate) fn delete(&mut self, query: &AttributeMap) -> Result<(), StoreStatus> {
        let before = self.items.len();
        self.items.retain(|item| !matches(item, query));

        if self.items.len() == before {
            return Err(StoreStatus::ITEM_NOT_FOUND);
        }
        Ok(())
    }
}

fn stored_payload(key: AttrKey) -> bool {
    matches!(key, AttrKey::ValueData | AttrKey::Accessible)
}

/// Every selecting attribute of the query must be present and equal on the item
fn matches(item: &AttributeMap, query: &AttributeMap) -> bool {
    query
        .iter()
        .filter(|(key, _)| key.is_matchable())
        .all(|(key, value)| item.get(key) == Some(value))
}

fn same_primary_key(a: &AttributeMap, b: &AttributeMap) -> bool {
    AttrKey::PRIMARY
        .iter()
        .all(|key| primary_value(a, *key) == primary_value(b, *key))
}

// An absent attribute compares equal to its empty default.
fn primary_value(item: &AttributeMap, key: AttrKey) -> Option<&AttrValue> {
    match item.get(&key) {
        Some(AttrValue::Text(s)) if s.is_empty() => None,
        Some(AttrValue::Number(0)) => None,
        other => other,
    }
}
