//! Attribute query builder
//!
//! Pure conversions between credential fields and secure-store attributes.
//! Nothing here touches a store.

use crate::attributes::{Accessibility, AttrKey, AttrValue, AttributeMap, ItemClass, ItemQuery, Protocol};
use crate::config::ManagerConfig;
use crate::credential::Credential;
use crate::error::{CredentialError, Result};
use crate::secure_string::SecretBytes;
use url::Url;

#[cfg(test)]
mod tests;

/// URL fields in attribute form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlAttributes {
    /// Protocol; `None` for schemes other than http/https
    pub protocol: Option<Protocol>,
    /// Host
    pub server: Option<String>,
    /// Explicit non-zero port
    pub port: Option<u16>,
    /// Non-empty path
    pub path: Option<String>,
}

/// Query seeded with the record class and, if configured, the access group
#[must_use]
pub fn base_query(class: ItemClass, config: &ManagerConfig) -> ItemQuery {
    ItemQuery {
        class,
        access_group: config.access_group.clone(),
        ..ItemQuery::default()
    }
}

/// Base query narrowed by whichever of account, URL and label are present
#[must_use]
pub fn lookup_query(
    config: &ManagerConfig,
    account: Option<&str>,
    url: Option<&Url>,
    label: Option<&str>,
) -> ItemQuery {
    let mut query = base_query(ItemClass::InternetPassword, config);
    query.account = account.map(str::to_string);
    query.label = label.map(str::to_string);

    if let Some(url) = url {
        let parts = decompose_url(url);
        query.protocol = parts.protocol;
        query.server = parts.server;
        query.port = parts.port;
        query.path = parts.path;
    }
    query
}

/// Split a URL into protocol, server, port and path attributes
///
/// Schemes other than http/https produce no protocol attribute. The parser
/// gives every http(s) URL at least a `/` path; a bare `/` counts as empty and
/// produces no path attribute.
#[must_use]
pub fn decompose_url(url: &Url) -> UrlAttributes {
    UrlAttributes {
        protocol: Protocol::from_scheme(url.scheme()),
        server: url.host_str().filter(|h| !h.is_empty()).map(str::to_string),
        port: url.port().filter(|p| *p > 0),
        path: Some(url.path())
            .filter(|p| !p.is_empty() && *p != "/")
            .map(str::to_string),
    }
}

/// Rebuild a URL from store attributes
///
/// Returns `None` when the protocol is missing or unrecognized, or the server
/// is missing.
#[must_use]
pub fn compose_url(attributes: &AttributeMap) -> Option<Url> {
    let protocol = text(attributes, AttrKey::Protocol).and_then(Protocol::from_code)?;
    let host = text(attributes, AttrKey::Server).filter(|h| !h.is_empty())?;

    let mut url = Url::parse(&format!("{}://localhost", protocol.scheme())).ok()?;
    url.set_host(Some(host)).ok()?;

    let port = attributes
        .get(&AttrKey::Port)
        .and_then(AttrValue::as_number)
        .filter(|p| *p > 0);
    if let Some(port) = port {
        url.set_port(Some(u16::try_from(port).ok()?)).ok()?;
    }

    if let Some(path) = text(attributes, AttrKey::Path).filter(|p| !p.is_empty()) {
        url.set_path(path);
    }
    Some(url)
}

/// Add the password and accessibility policy to a write query
///
/// Fails with [`CredentialError::Encoding`] unless `password` is UTF-8.
pub fn attach_write_payload(
    mut query: ItemQuery,
    password: &[u8],
    accessibility: Accessibility,
) -> Result<ItemQuery> {
    std::str::from_utf8(password).map_err(|_| CredentialError::Encoding)?;

    query.value = Some(SecretBytes::new(password));
    query.accessible = Some(accessibility);
    Ok(query)
}

/// Decode a lookup result into a credential
///
/// Fails with [`CredentialError::UnknownResult`] when the payload, account or
/// a decodable URL is missing.
pub fn decode_credential(attributes: &AttributeMap) -> Result<Credential> {
    let password = attributes
        .get(&AttrKey::ValueData)
        .and_then(AttrValue::as_data)
        .and_then(SecretBytes::to_secure_string)
        .ok_or(CredentialError::UnknownResult)?;

    let account = text(attributes, AttrKey::Account)
        .filter(|a| !a.is_empty())
        .ok_or(CredentialError::UnknownResult)?;

    let url = compose_url(attributes).ok_or(CredentialError::UnknownResult)?;

    Ok(Credential::from_parts(account.to_string(), password, url))
}

fn text(attributes: &AttributeMap, key: AttrKey) -> Option<&str> {
    attributes.get(&key).and_then(AttrValue::as_text)
}
