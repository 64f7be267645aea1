//! Credential manager
//!
//! Public lifecycle operations over a secure store. Each call is a complete
//! transaction against the store; the manager keeps nothing between calls
//! except its configuration.

use crate::adapter::StoreAdapter;
use crate::config::ManagerConfig;
use crate::credential::{validate_account, validate_url, Credential, CredentialQuery};
use crate::error::Result;
use crate::query::{attach_write_payload, decode_credential, lookup_query};
use crate::secure_string::SecureString;
use crate::store::SecureStore;
use tracing::debug;
use url::Url;

#[cfg(test)]
mod tests;

/// Stores, fetches, replaces and deletes network credentials
pub struct CredentialManager<S = Box<dyn SecureStore>> {
    adapter: StoreAdapter<S>,
    config: ManagerConfig,
}

impl<S: SecureStore> CredentialManager<S> {
    /// Create a manager over `store`
    #[must_use]
    pub fn new(store: S, config: ManagerConfig) -> Self {
        Self {
            adapter: StoreAdapter::new(store),
            config,
        }
    }

    /// Configuration this manager was built with
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The underlying store
    #[must_use]
    pub fn store(&self) -> &S {
        self.adapter.store()
    }

    /// Insert a credential for `account` at `url`
    ///
    /// The store refuses to overwrite: an existing item with the same
    /// account and URL fails with [`CredentialError::Add`](crate::CredentialError::Add).
    pub fn set_credential(
        &self,
        password: impl AsRef<[u8]>,
        account: &str,
        url: &Url,
        label: Option<&str>,
    ) -> Result<()> {
        validate_account(account)?;
        validate_url(url)?;

        debug!(account = %account, server = ?url.host_str(), label = ?label, "Storing credential");

        let query = lookup_query(&self.config, Some(account), Some(url), label);
        let query = attach_write_payload(query, password.as_ref(), self.config.accessibility)?;
        self.adapter.insert(&query)
    }

    /// Delete whatever is stored under `label`, then store `credential`
    /// under it if one is given
    ///
    /// Not atomic: a failed delete aborts before anything is written, and a
    /// failed insert leaves the label empty.
    pub fn replace_credentials(&self, credential: Option<&Credential>, label: &str) -> Result<()> {
        debug!(label = %label, replace = credential.is_some(), "Replacing credentials");

        self.delete_credentials(&CredentialQuery::for_label(label))?;

        match credential {
            Some(credential) => self.set_credential(
                credential.password(),
                credential.username(),
                credential.url(),
                Some(label),
            ),
            None => Ok(()),
        }
    }

    /// Fetch the first credential matching `query`
    ///
    /// Fails with [`CredentialError::Copy`](crate::CredentialError::Copy) when
    /// the store fails or nothing matches, and with
    /// [`CredentialError::UnknownResult`](crate::CredentialError::UnknownResult)
    /// when the match cannot be decoded.
    pub fn get_credentials(&self, query: &CredentialQuery) -> Result<Credential> {
        if let Some(url) = &query.url {
            validate_url(url)?;
        }

        debug!(
            account = ?query.account,
            server = ?query.url.as_ref().and_then(Url::host_str),
            label = ?query.label,
            "Retrieving credential"
        );

        let raw = self.adapter.lookup(&self.item_query(query))?;
        decode_credential(&raw)
    }

    /// Delete every credential matching `query`; deleting nothing succeeds
    pub fn delete_credentials(&self, query: &CredentialQuery) -> Result<()> {
        if let Some(url) = &query.url {
            validate_url(url)?;
        }

        debug!(account = ?query.account, label = ?query.label, "Deleting credentials");

        self.adapter.remove(&self.item_query(query))
    }

    /// Whether a decodable credential matches `query`
    pub fn contains(&self, query: &CredentialQuery) -> Result<bool> {
        match self.get_credentials(query) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Password from `env_var` if set, otherwise from the store
    pub fn password_or_env(&self, query: &CredentialQuery, env_var: &str) -> Result<SecureString> {
        if let Ok(value) = std::env::var(env_var) {
            debug!(env_var = %env_var, "Using password from environment");
            return Ok(SecureString::new(value));
        }

        Ok(self.get_credentials(query)?.password().clone())
    }

    fn item_query(&self, query: &CredentialQuery) -> crate::attributes::ItemQuery {
        lookup_query(
            &self.config,
            query.account.as_deref(),
            query.url.as_ref(),
            query.label.as_deref(),
        )
    }
}

impl<S> std::fmt::Debug for CredentialManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
