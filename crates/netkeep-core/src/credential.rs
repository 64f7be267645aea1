//! Credential types

use crate::attributes::Protocol;
use crate::error::{CredentialError, Result};
use crate::secure_string::SecureString;
use url::Url;

/// Username, password and target URL of a network service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    password: SecureString,
    url: Url,
}

impl Credential {
    /// Create a credential
    ///
    /// Fails with [`CredentialError::InvalidCredential`] if the username is
    /// empty or the URL is not an `http`/`https` URL with a host.
    pub fn new(username: impl Into<String>, password: impl Into<String>, url: Url) -> Result<Self> {
        let username = username.into();
        validate_account(&username)?;
        validate_url(&url)?;

        Ok(Self {
            username,
            password: SecureString::new(password),
            url,
        })
    }

    /// Build from store output already known to be well-formed
    pub(crate) fn from_parts(username: String, password: SecureString, url: Url) -> Self {
        Self {
            username,
            password,
            url,
        }
    }

    /// Account name
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password
    #[must_use]
    pub fn password(&self) -> &SecureString {
        &self.password
    }

    /// Target URL
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Which credentials a lookup or delete touches
///
/// Unset fields widen the match; an empty query matches every credential in
/// the configured access group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialQuery {
    /// Account name
    pub account: Option<String>,
    /// Target URL
    pub url: Option<Url>,
    /// Label
    pub label: Option<String>,
}

impl CredentialQuery {
    /// Empty query
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query by label only
    #[must_use]
    pub fn for_label(label: impl Into<String>) -> Self {
        Self::new().label(label)
    }

    /// Restrict to an account
    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Restrict to a URL
    #[must_use]
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Restrict to a label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

pub(crate) fn validate_account(account: &str) -> Result<()> {
    if account.is_empty() {
        return Err(CredentialError::invalid("username must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_url(url: &Url) -> Result<()> {
    if Protocol::from_scheme(url.scheme()).is_none() {
        return Err(CredentialError::invalid(format!(
            "unsupported URL scheme '{}', expected http or https",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(CredentialError::invalid("URL has no host"));
    }
    Ok(())
}
