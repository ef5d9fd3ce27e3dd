//! Secure credential handling using the secrecy crate
//!
//! Connection strings carry client secrets and passwords. They are held in
//! `Secret<T>` containers which zero their memory on drop, redact their
//! `Debug` output, and must be read explicitly with `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use solution_exporter::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let connection = secret_string("AuthType=ClientSecret;ClientSecret=abc".to_string());
//! assert!(connection.expose_secret().starts_with("AuthType"));
//!
//! // Debug output is redacted
//! assert!(!format!("{connection:?}").contains("abc"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Borrow the protected string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the value is empty or only whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Check if the secret value starts with a prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}
