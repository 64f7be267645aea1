//! Zeroizing holders for passwords and payload bytes

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A password string that is wiped from memory when dropped
///
/// Debug and Display never print the value, and equality is constant-time.
///
/// # Example
///
/// ```
/// use netkeep_core::SecureString;
///
/// let secret = SecureString::new("hunter2");
/// assert_eq!(secret.expose(), "hunter2");
/// assert!(!format!("{:?}", secret).contains("hunter2"));
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Temporarily expose the string value
    ///
    /// Keep the returned reference in a narrow scope; do not clone it into
    /// plain `String`s.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the secret is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl AsRef<[u8]> for SecureString {
    fn as_ref(&self) -> &[u8] {
        self.inner.as_bytes()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString([REDACTED, {} bytes])", self.inner.len())
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        self.inner.as_bytes().ct_eq(other.inner.as_bytes()).into()
    }
}

impl Eq for SecureString {}

/// Raw payload bytes (the `v_Data` attribute), wiped on drop
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretBytes {
    inner: Vec<u8>,
}

impl SecretBytes {
    /// Copy bytes into a new zeroizing buffer
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: bytes.into(),
        }
    }

    /// Temporarily expose the bytes
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.inner
    }

    /// Decode as UTF-8 text, if possible
    #[must_use]
    pub fn to_secure_string(&self) -> Option<SecureString> {
        std::str::from_utf8(&self.inner).ok().map(SecureString::new)
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED, {} bytes])", self.inner.len())
    }
}

impl PartialEq for SecretBytes {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ct_eq(&other.inner).into()
    }
}

impl Eq for SecretBytes {}
