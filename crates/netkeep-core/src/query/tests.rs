//! Tests for the attribute query builder

use super::*;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn text(s: &str) -> AttrValue {
    AttrValue::Text(s.to_string())
}

#[test]
fn test_url_round_trip() {
    for raw in [
        "https://example.com/api",
        "http://example.com/",
        "https://example.com:8443/v1/items",
        "http://127.0.0.1:8080/",
        "https://[::1]:9000/health",
        "https://example.com/a%20b",
    ] {
        let original = url(raw);
        let query = lookup_query(&ManagerConfig::default(), None, Some(&original), None);
        let composed = compose_url(&query.to_attributes());
        assert_eq!(composed.as_ref(), Some(&original), "round trip of {}", raw);
    }
}

#[test]
fn test_decompose_url() {
    let parts = decompose_url(&url("https://example.com:8443/api"));

    assert_eq!(parts.protocol, Some(Protocol::Https));
    assert_eq!(parts.server.as_deref(), Some("example.com"));
    assert_eq!(parts.port, Some(8443));
    assert_eq!(parts.path.as_deref(), Some("/api"));
}

#[test]
fn test_decompose_url_omits_root_path() {
    assert_eq!(decompose_url(&url("https://example.com")).path, None);
    assert_eq!(decompose_url(&url("http://127.0.0.1:8080/")).path, None);
    assert_eq!(
        decompose_url(&url("https://example.com/api/")).path.as_deref(),
        Some("/api/")
    );

    let query = lookup_query(
        &ManagerConfig::default(),
        None,
        Some(&url("https://example.com/")),
        None,
    );
    assert!(!query.to_attributes().contains_key(&AttrKey::Path));
}

#[test]
fn test_decompose_url_omits_default_and_zero_port() {
    // The default port is normalized away by the URL parser
    assert_eq!(decompose_url(&url("https://example.com:443/")).port, None);
    assert_eq!(decompose_url(&url("http://example.com:0/")).port, None);
}

#[test]
fn test_decompose_url_drops_unknown_scheme() {
    let parts = decompose_url(&url("ftp://files.example.com/pub"));

    assert_eq!(parts.protocol, None);
    assert_eq!(parts.server.as_deref(), Some("files.example.com"));
}

#[test]
fn test_compose_url_requires_protocol_and_server() {
    let mut attributes = AttributeMap::new();
    attributes.insert(AttrKey::Server, text("example.com"));
    assert_eq!(compose_url(&attributes), None);

    attributes.insert(AttrKey::Protocol, text("ftp "));
    assert_eq!(compose_url(&attributes), None);

    attributes.insert(AttrKey::Protocol, text("htps"));
    assert_eq!(compose_url(&attributes), Some(url("https://example.com/")));

    attributes.remove(&AttrKey::Server);
    assert_eq!(compose_url(&attributes), None);
}

#[test]
fn test_base_query_carries_access_group() {
    let config = ManagerConfig::default().with_access_group("team.shared");
    let attributes = base_query(ItemClass::InternetPassword, &config).to_attributes();

    assert_eq!(attributes.get(&AttrKey::Class), Some(&text("inet")));
    assert_eq!(attributes.get(&AttrKey::AccessGroup), Some(&text("team.shared")));
    assert_eq!(attributes.len(), 2);

    let unscoped = base_query(ItemClass::InternetPassword, &ManagerConfig::default());
    assert!(!unscoped.to_attributes().contains_key(&AttrKey::AccessGroup));
}

#[test]
fn test_lookup_query_omits_absent_fields() {
    let config = ManagerConfig::default();

    let label_only = lookup_query(&config, None, None, Some("svc")).to_attributes();
    assert_eq!(label_only.len(), 2);
    assert_eq!(label_only.get(&AttrKey::Label), Some(&text("svc")));

    let full = lookup_query(
        &config,
        Some("u1"),
        Some(&url("https://example.com:8443/api")),
        Some("svc"),
    )
    .to_attributes();
    assert_eq!(full.get(&AttrKey::Account), Some(&text("u1")));
    assert_eq!(full.get(&AttrKey::Server), Some(&text("example.com")));
    assert_eq!(full.get(&AttrKey::Port), Some(&AttrValue::Number(8443)));
    assert_eq!(full.get(&AttrKey::Path), Some(&text("/api")));
    assert_eq!(full.get(&AttrKey::Protocol), Some(&text("htps")));
    assert!(!full.contains_key(&AttrKey::ValueData));
}

#[test]
fn test_attach_write_payload() {
    let query = lookup_query(&ManagerConfig::default(), Some("u1"), None, None);
    let query = attach_write_payload(query, b"p1", Accessibility::WhenUnlocked).unwrap();
    let attributes = query.to_attributes();

    assert_eq!(
        attributes.get(&AttrKey::ValueData),
        Some(&AttrValue::Data(SecretBytes::new(b"p1".to_vec())))
    );
    assert_eq!(attributes.get(&AttrKey::Accessible), Some(&text("ak")));
}

#[test]
fn test_attach_write_payload_rejects_invalid_utf8() {
    let query = lookup_query(&ManagerConfig::default(), Some("u1"), None, None);
    let err = attach_write_payload(query, &[0x66, 0x6f, 0xff], Accessibility::default()).unwrap_err();

    assert!(matches!(err, CredentialError::Encoding));
}

#[test]
fn test_decode_credential() {
    let mut attributes = lookup_query(
        &ManagerConfig::default(),
        Some("u1"),
        Some(&url("https://example.com/api")),
        None,
    )
    .to_attributes();
    attributes.insert(AttrKey::ValueData, AttrValue::Data(SecretBytes::new(b"p1".to_vec())));

    let cred = decode_credential(&attributes).unwrap();
    assert_eq!(cred, Credential::new("u1", "p1", url("https://example.com/api")).unwrap());
}

#[test]
fn test_decode_incomplete_result() {
    let complete = {
        let mut attributes = lookup_query(
            &ManagerConfig::default(),
            Some("u1"),
            Some(&url("https://example.com/api")),
            None,
        )
        .to_attributes();
        attributes.insert(AttrKey::ValueData, AttrValue::Data(SecretBytes::new(b"p1".to_vec())));
        attributes
    };

    for key in [AttrKey::ValueData, AttrKey::Account, AttrKey::Server, AttrKey::Protocol] {
        let mut attributes = complete.clone();
        attributes.remove(&key);
        assert!(
            matches!(decode_credential(&attributes), Err(CredentialError::UnknownResult)),
            "missing {}",
            key
        );
    }

    let mut not_utf8 = complete;
    not_utf8.insert(AttrKey::ValueData, AttrValue::Data(SecretBytes::new(vec![0xff])));
    assert!(matches!(decode_credential(&not_utf8), Err(CredentialError::UnknownResult)));
}
