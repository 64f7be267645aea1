//! Manager configuration

use crate::attributes::Accessibility;
use serde::{Deserialize, Serialize};

/// Settings fixed for the life of a [`CredentialManager`](crate::CredentialManager)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// When the store may release written items (default: after first unlock)
    #[serde(default)]
    pub accessibility: Accessibility,

    /// Restrict every query to this access group
    #[serde(default)]
    pub access_group: Option<String>,
}

impl ManagerConfig {
    /// Set the accessibility policy
    #[must_use]
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Scope queries to an access group
    #[must_use]
    pub fn with_access_group(mut self, group: impl Into<String>) -> Self {
        self.access_group = Some(group.into());
        self
    }
}
