//! API keys that stay out of logs
//!
//! `SecretString` prints as `[REDACTED]` through both `Debug` and `Display`,
//! so provider settings and adapter configs can be traced with `?config`.
//! Only adapter construction reads the raw value.

use serde::{Deserialize, Serialize};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// Vendor key prefixes worth keeping in log lines, longest first
const KEY_PREFIXES: &[&str] = &["sk-ant-", "sk-proj-", "sk-"];

/// An API key or other credential read from configuration
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw credential, for building auth headers
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Enough of the key to tell two keys apart in a log line.
    ///
    /// Keeps a known vendor prefix and the last four characters. Keys of
    /// eight characters or fewer are not shortened, only hidden.
    pub fn partial_redact(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return REDACTED.to_string();
        }

        let prefix = KEY_PREFIXES
            .iter()
            .find(|prefix| self.0.starts_with(**prefix))
            .copied()
            .unwrap_or_default();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, tail)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
