//! Tests for the credential manager

use super::*;
use crate::attributes::{AttrKey, AttrValue, AttributeMap};
use crate::error::CredentialError;
use crate::secure_string::SecretBytes;
use crate::store::{MemoryStore, MockSecureStore, SecureStore, StoreStatus};
use std::sync::Arc;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn manager() -> CredentialManager<MemoryStore> {
    CredentialManager::new(MemoryStore::new(), ManagerConfig::default())
}

#[test]
fn test_set_then_get_by_label() {
    let manager = manager();
    manager
        .set_credential("p1", "u1", &url("https://example.com/api"), Some("svc"))
        .unwrap();

    let cred = manager.get_credentials(&CredentialQuery::for_label("svc")).unwrap();
    assert_eq!(
        cred,
        Credential::new("u1", "p1", url("https://example.com/api")).unwrap()
    );
}

#[test]
fn test_set_then_get_with_same_fields() {
    let manager = manager();
    let target = url("http://10.0.0.5:8080/sensor");
    manager.set_credential("secret", "admin", &target, None).unwrap();

    let query = CredentialQuery::new().account("admin").url(target.clone());
    let cred = manager.get_credentials(&query).unwrap();
    assert_eq!(cred.username(), "admin");
    assert_eq!(cred.password().expose(), "secret");
    assert_eq!(cred.url(), &target);
}

#[test]
fn test_set_duplicate_fails_with_add_error() {
    let manager = manager();
    let target = url("https://example.com/api");
    manager.set_credential("p1", "u1", &target, Some("svc")).unwrap();

    let err = manager
        .set_credential("p2", "u1", &target, Some("svc"))
        .unwrap_err();
    assert!(matches!(err, CredentialError::Add(StoreStatus::DUPLICATE_ITEM)));

    // The original value is untouched
    let cred = manager.get_credentials(&CredentialQuery::for_label("svc")).unwrap();
    assert_eq!(cred.password().expose(), "p1");
}

#[test]
fn test_set_rejects_invalid_input_before_store() {
    let manager = manager();

    let err = manager
        .set_credential("p1", "", &url("https://example.com"), None)
        .unwrap_err();
    assert!(matches!(err, CredentialError::InvalidCredential(_)));

    let err = manager
        .set_credential("p1", "u1", &url("ftp://example.com"), None)
        .unwrap_err();
    assert!(matches!(err, CredentialError::InvalidCredential(_)));

    let err = manager
        .set_credential(&[0xffu8, 0xfe][..], "u1", &url("https://example.com"), None)
        .unwrap_err();
    assert!(matches!(err, CredentialError::Encoding));

    assert!(manager.store().is_empty());
}

#[test]
fn test_replace_with_none_removes_label() {
    let manager = manager();
    manager
        .set_credential("p1", "u1", &url("https://example.com/api"), Some("svc"))
        .unwrap();

    manager.replace_credentials(None, "svc").unwrap();

    let err = manager
        .get_credentials(&CredentialQuery::for_label("svc"))
        .unwrap_err();
    assert!(matches!(err, CredentialError::Copy(StoreStatus::ITEM_NOT_FOUND)));
}

#[test]
fn test_replace_twice_keeps_only_latest() {
    let manager = manager();
    let first = Credential::new("u1", "p1", url("https://one.example.com/")).unwrap();
    let second = Credential::new("u2", "p2", url("https://two.example.com/v2")).unwrap();

    manager.replace_credentials(Some(&first), "svc").unwrap();
    manager.replace_credentials(Some(&second), "svc").unwrap();

    assert_eq!(manager.store().len(), 1);
    let cred = manager.get_credentials(&CredentialQuery::for_label("svc")).unwrap();
    assert_eq!(cred, second);
}

#[test]
fn test_replace_same_credential_is_repeatable() {
    let manager = manager();
    let cred = Credential::new("u1", "p1", url("https://example.com/api")).unwrap();

    // Delete-then-insert never collides with itself
    manager.replace_credentials(Some(&cred), "svc").unwrap();
    manager.replace_credentials(Some(&cred), "svc").unwrap();
    assert_eq!(manager.store().len(), 1);
}

#[test]
fn test_replace_leaves_other_labels() {
    let manager = manager();
    manager
        .set_credential("keep", "u9", &url("https://other.example.com/"), Some("other"))
        .unwrap();

    manager.replace_credentials(None, "svc").unwrap();

    assert!(manager.contains(&CredentialQuery::for_label("other")).unwrap());
}

#[test]
fn test_replace_delete_failure_aborts_insert() {
    let mut store = MockSecureStore::new();
    store
        .expect_delete()
        .times(1)
        .returning(|_| Err(StoreStatus::AUTH_FAILED));
    store.expect_add().times(0);

    let manager = CredentialManager::new(store, ManagerConfig::default());
    let cred = Credential::new("u1", "p1", url("https://example.com/api")).unwrap();

    let err = manager.replace_credentials(Some(&cred), "svc").unwrap_err();
    assert!(matches!(err, CredentialError::Delete(StoreStatus::AUTH_FAILED)));
}

#[test]
fn test_replace_insert_failure_keeps_label_empty() {
    let manager = manager();
    manager
        .set_credential("old", "u0", &url("https://old.example.com/"), Some("svc"))
        .unwrap();
    manager
        .set_credential("p1", "u1", &url("https://example.com/api"), Some("other"))
        .unwrap();

    // Same primary key as the item under "other"
    let clash = Credential::new("u1", "p2", url("https://example.com/api")).unwrap();
    let err = manager.replace_credentials(Some(&clash), "svc").unwrap_err();
    assert!(matches!(err, CredentialError::Add(StoreStatus::DUPLICATE_ITEM)));

    // The old item is gone and nothing took its place
    assert!(!manager.contains(&CredentialQuery::for_label("svc")).unwrap());
    let other = manager.get_credentials(&CredentialQuery::for_label("other")).unwrap();
    assert_eq!(other.password().expose(), "p1");
    assert_eq!(manager.store().len(), 1);
}

#[test]
fn test_delete_absent_succeeds() {
    let manager = manager();
    manager
        .delete_credentials(&CredentialQuery::for_label("nothing-here"))
        .unwrap();
    manager.replace_credentials(None, "nothing-here").unwrap();
}

#[test]
fn test_get_undecodable_is_unknown_result() {
    let store = Arc::new(MemoryStore::new());
    let mut raw = AttributeMap::new();
    raw.insert(AttrKey::Class, AttrValue::Text("inet".into()));
    raw.insert(AttrKey::Account, AttrValue::Text("u1".into()));
    raw.insert(AttrKey::Server, AttrValue::Text("files.example.com".into()));
    raw.insert(AttrKey::Protocol, AttrValue::Text("ftp ".into()));
    raw.insert(AttrKey::Label, AttrValue::Text("svc".into()));
    raw.insert(AttrKey::ValueData, AttrValue::Data(SecretBytes::new(b"p1".to_vec())));
    store.add(&raw).unwrap();

    let manager = CredentialManager::new(Arc::clone(&store), ManagerConfig::default());
    let err = manager
        .get_credentials(&CredentialQuery::for_label("svc"))
        .unwrap_err();
    assert!(matches!(err, CredentialError::UnknownResult));

    // Found-but-undecodable still counts as an error for contains()
    assert!(manager.contains(&CredentialQuery::for_label("svc")).is_err());
}

#[test]
fn test_access_group_isolates_managers() {
    let store = Arc::new(MemoryStore::new());
    let team_a = CredentialManager::new(
        Arc::clone(&store),
        ManagerConfig::default().with_access_group("team.a"),
    );
    let team_b = CredentialManager::new(
        Arc::clone(&store),
        ManagerConfig::default().with_access_group("team.b"),
    );

    let target = url("https://example.com/api");
    team_a.set_credential("pa", "u1", &target, Some("svc")).unwrap();
    // Same account and URL in another group is a distinct item
    team_b.set_credential("pb", "u1", &target, Some("svc")).unwrap();

    team_b.replace_credentials(None, "svc").unwrap();

    let cred = team_a.get_credentials(&CredentialQuery::for_label("svc")).unwrap();
    assert_eq!(cred.password().expose(), "pa");
    assert!(!team_b.contains(&CredentialQuery::for_label("svc")).unwrap());
}

#[test]
fn test_accessibility_written_with_item() {
    let store = Arc::new(MemoryStore::new());
    let manager = CredentialManager::new(
        Arc::clone(&store),
        ManagerConfig::default().with_accessibility(crate::Accessibility::WhenUnlockedThisDeviceOnly),
    );
    manager
        .set_credential("p1", "u1", &url("https://example.com/"), Some("svc"))
        .unwrap();

    let mut query = AttributeMap::new();
    query.insert(AttrKey::Label, AttrValue::Text("svc".into()));
    query.insert(AttrKey::ReturnAttributes, AttrValue::Bool(true));
    let item = store.copy_matching(&query).unwrap();
    assert_eq!(item.get(&AttrKey::Accessible), Some(&AttrValue::Text("aku".into())));
}

#[test]
fn test_password_or_env() {
    let manager = manager();
    let query = CredentialQuery::for_label("svc");

    std::env::set_var("NETKEEP_TEST_PASSWORD_OR_ENV", "env-value");
    let value = manager
        .password_or_env(&query, "NETKEEP_TEST_PASSWORD_OR_ENV")
        .unwrap();
    assert_eq!(value.expose(), "env-value");
    std::env::remove_var("NETKEEP_TEST_PASSWORD_OR_ENV");

    assert!(manager
        .password_or_env(&query, "NETKEEP_TEST_PASSWORD_OR_ENV")
        .is_err());

    manager
        .set_credential("stored", "u1", &url("https://example.com/"), Some("svc"))
        .unwrap();
    let value = manager
        .password_or_env(&query, "NETKEEP_TEST_PASSWORD_OR_ENV")
        .unwrap();
    assert_eq!(value.expose(), "stored");
}

#[test]
fn test_boxed_store() {
    let manager: CredentialManager = CredentialManager::new(
        Box::new(MemoryStore::new()) as Box<dyn SecureStore>,
        ManagerConfig::default(),
    );
    manager
        .set_credential("p1", "u1", &url("https://example.com/"), None)
        .unwrap();
    assert!(manager
        .contains(&CredentialQuery::new().account("u1"))
        .unwrap());
}
