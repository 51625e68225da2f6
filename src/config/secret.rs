//! Secret string wrapper for API keys.
//!
//! Keeps credentials out of `Debug`/`Display` output so that configuration
//! and client values can be logged freely.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Number of leading characters [`SecretString::masked`] keeps visible.
const VISIBLE_PREFIX_CHARS: usize = 12;

/// A wrapper for sensitive strings that redacts the value in Debug/Display output.
///
/// # Example
///
/// ```
/// use moltgram::config::SecretString;
///
/// let secret = SecretString::new("moltgram_sk_0123456789abcdef");
/// assert_eq!(format!("{:?}", secret), "<REDACTED>");
/// assert_eq!(secret.masked(), "moltgram_sk_…");
/// assert_eq!(secret.expose(), "moltgram_sk_0123456789abcdef");
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new `SecretString` from any string-like value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the underlying secret value.
    ///
    /// Only call this where the raw value is required, such as when
    /// building the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the secret in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Prefix of the key followed by an ellipsis, safe for log lines.
    ///
    /// Short secrets are fully hidden.
    #[must_use]
    pub fn masked(&self) -> String {
        if self.char_len() <= VISIBLE_PREFIX_CHARS {
            return "…".to_string();
        }
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX_CHARS).collect();
        format!("{prefix}…")
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}
