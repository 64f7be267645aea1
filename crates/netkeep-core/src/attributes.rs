//! Secure-store attribute vocabulary
//!
//! Queries are assembled as a typed [`ItemQuery`] and only flattened into the
//! store's native [`AttributeMap`] at the store boundary. Results come back as
//! an `AttributeMap` and are decoded by the query builder.

use crate::secure_string::SecretBytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Native attribute dictionary passed to and returned from a secure store
pub type AttributeMap = BTreeMap<AttrKey, AttrValue>;

/// Attribute keys understood by the secure-store protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttrKey {
    /// Item class
    #[serde(rename = "class")]
    Class,
    /// Account (username)
    #[serde(rename = "acct")]
    Account,
    /// Server host
    #[serde(rename = "srvr")]
    Server,
    /// Server port
    #[serde(rename = "port")]
    Port,
    /// Resource path on the server
    #[serde(rename = "path")]
    Path,
    /// Protocol scheme code
    #[serde(rename = "ptcl")]
    Protocol,
    /// Caller-chosen label
    #[serde(rename = "labl")]
    Label,
    /// Accessibility policy
    #[serde(rename = "pdmn")]
    Accessible,
    /// Payload bytes
    #[serde(rename = "v_Data")]
    ValueData,
    /// Access-group scope
    #[serde(rename = "agrp")]
    AccessGroup,
    /// Ask the store to return the payload
    #[serde(rename = "r_Data")]
    ReturnData,
    /// Ask the store to return the attributes
    #[serde(rename = "r_Attributes")]
    ReturnAttributes,
    /// Limit on the number of matches
    #[serde(rename = "m_Limit")]
    MatchLimit,
}

impl AttrKey {
    /// Protocol identifier of this key
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Account => "acct",
            Self::Server => "srvr",
            Self::Port => "port",
            Self::Path => "path",
            Self::Protocol => "ptcl",
            Self::Label => "labl",
            Self::Accessible => "pdmn",
            Self::ValueData => "v_Data",
            Self::AccessGroup => "agrp",
            Self::ReturnData => "r_Data",
            Self::ReturnAttributes => "r_Attributes",
            Self::MatchLimit => "m_Limit",
        }
    }

    /// Whether the key selects items (as opposed to carrying payload or
    /// controlling the result shape)
    #[must_use]
    pub fn is_matchable(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Account
                | Self::Server
                | Self::Port
                | Self::Path
                | Self::Protocol
                | Self::Label
                | Self::AccessGroup
        )
    }

    /// Keys that make an item unique within its class
    pub const PRIMARY: [AttrKey; 7] = [
        Self::Class,
        Self::AccessGroup,
        Self::Account,
        Self::Server,
        Self::Port,
        Self::Path,
        Self::Protocol,
    ];
}

impl std::fmt::Display for AttrKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    /// UTF-8 text
    Text(String),
    /// Unsigned integer
    Number(u32),
    /// Flag
    Bool(bool),
    /// Opaque bytes
    Data(SecretBytes),
}

impl AttrValue {
    /// Text content, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number value
    #[must_use]
    pub fn as_number(&self) -> Option<u32> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Byte content, if this is a data value
    #[must_use]
    pub fn as_data(&self) -> Option<&SecretBytes> {
        match self {
            Self::Data(d) => Some(d),
            _ => None,
        }
    }
}

/// Record class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemClass {
    /// Password for a network service
    #[default]
    InternetPassword,
}

impl ItemClass {
    /// Protocol code of this class
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::InternetPassword => "inet",
        }
    }
}

/// Protocol attribute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Plain HTTP
    Http,
    /// HTTP over TLS
    Https,
}

impl Protocol {
    /// Four-character protocol code stored in the `ptcl` attribute
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "htps",
        }
    }

    /// Parse a protocol code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "http" => Some(Self::Http),
            "htps" => Some(Self::Https),
            _ => None,
        }
    }

    /// Map a URL scheme to its protocol; anything but http(s) has none
    #[must_use]
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            _ => None,
        }
    }

    /// URL scheme for this protocol
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// When the secure store may release an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Only while the device is unlocked
    WhenUnlocked,
    /// After the first unlock following a restart
    #[default]
    AfterFirstUnlock,
    /// While unlocked, never migrated to another device
    WhenUnlockedThisDeviceOnly,
    /// After first unlock, never migrated to another device
    AfterFirstUnlockThisDeviceOnly,
    /// Only while a passcode is set, never migrated
    WhenPasscodeSetThisDeviceOnly,
}

impl Accessibility {
    /// Protocol code stored in the `pdmn` attribute
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::WhenUnlocked => "ak",
            Self::AfterFirstUnlock => "ck",
            Self::WhenUnlockedThisDeviceOnly => "aku",
            Self::AfterFirstUnlockThisDeviceOnly => "cku",
            Self::WhenPasscodeSetThisDeviceOnly => "akpu",
        }
    }
}

/// Match-limit value asking for a single item
pub const MATCH_LIMIT_ONE: &str = "m_LimitOne";

/// Typed secure-store query
///
/// Every field maps to one protocol attribute. Unset fields are omitted from
/// the flattened dictionary, so fewer fields mean a broader match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Record class
    pub class: ItemClass,
    /// Access-group scope
    pub access_group: Option<String>,
    /// Account
    pub account: Option<String>,
    /// Server host
    pub server: Option<String>,
    /// Server port
    pub port: Option<u16>,
    /// Resource path
    pub path: Option<String>,
    /// Protocol
    pub protocol: Option<Protocol>,
    /// Label
    pub label: Option<String>,
    /// Accessibility policy (writes only)
    pub accessible: Option<Accessibility>,
    /// Payload (writes only)
    pub value: Option<SecretBytes>,
    /// Return the payload with the result
    pub return_data: bool,
    /// Return the attributes with the result
    pub return_attributes: bool,
    /// Stop after the first match
    pub match_one: bool,
}

impl ItemQuery {
    /// Flatten into the store's native dictionary
    #[must_use]
    pub fn to_attributes(&self) -> AttributeMap {
        let mut map = AttributeMap::new();
        map.insert(AttrKey::Class, AttrValue::Text(self.class.code().to_string()));

        let text = |v: &Option<String>| v.as_ref().map(|s| AttrValue::Text(s.clone()));
        let entries = [
            (AttrKey::AccessGroup, text(&self.access_group)),
            (AttrKey::Account, text(&self.account)),
            (AttrKey::Server, text(&self.server)),
            (AttrKey::Port, self.port.map(|p| AttrValue::Number(u32::from(p)))),
            (AttrKey::Path, text(&self.path)),
            (
                AttrKey::Protocol,
                self.protocol.map(|p| AttrValue::Text(p.code().to_string())),
            ),
            (AttrKey::Label, text(&self.label)),
            (
                AttrKey::Accessible,
                self.accessible.map(|a| AttrValue::Text(a.code().to_string())),
            ),
            (AttrKey::ValueData, self.value.clone().map(AttrValue::Data)),
            (AttrKey::ReturnData, self.return_data.then_some(AttrValue::Bool(true))),
            (
                AttrKey::ReturnAttributes,
                self.return_attributes.then_some(AttrValue::Bool(true)),
            ),
            (
                AttrKey::MatchLimit,
                self.match_one
                    .then(|| AttrValue::Text(MATCH_LIMIT_ONE.to_string())),
            ),
        ];

        for (key, value) in entries {
            if let Some(value) = value {
                map.insert(key, value);
            }
        }
        map
    }
}

/// Read a boolean control flag from a native dictionary
pub(crate) fn flag(map: &AttributeMap, key: AttrKey) -> bool {
    matches!(map.get(&key), Some(AttrValue::Bool(true)))
}
