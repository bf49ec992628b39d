//! Program locators.
//!
//! A locator names where a program comes from: a URL to fetch, or an inline
//! payload shipped with the request. Inline payloads arrive base64-encoded
//! and are decoded once at the boundary, so everything downstream sees plain
//! text.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while constructing a locator.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// Inline payload was not valid base64.
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Inline payload decoded to non-UTF-8 bytes.
    #[error("Inline payload is not valid UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// Where to obtain a program from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramLocator {
    /// Fetch the program from a URL.
    Url(String),
    /// The program text itself (already decoded).
    Inline(String),
}

impl ProgramLocator {
    /// Create a URL locator.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Create an inline locator from decoded program text.
    pub fn inline(text: impl Into<String>) -> Self {
        Self::Inline(text.into())
    }

    /// Create an inline locator from a base64-encoded payload.
    pub fn from_base64(encoded: &str) -> Result<Self, LocatorError> {
        let bytes = BASE64.decode(encoded.trim())?;
        Ok(Self::Inline(String::from_utf8(bytes)?))
    }

    /// Last path segment of a URL locator, if any.
    ///
    /// Used to derive display names: `https://host/algos/grover.qasm`
    /// yields `grover.qasm`. Inline locators have no file name.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ProgramLocator::Url(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                let name = path.rsplit('/').next()?;
                if name.is_empty() { None } else { Some(name) }
            }
            ProgramLocator::Inline(_) => None,
        }
    }

    /// Whether this locator points at a remote resource.
    pub fn is_remote(&self) -> bool {
        matches!(self, ProgramLocator::Url(_))
    }
}

impl std::fmt::Display for ProgramLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramLocator::Url(url) => write!(f, "{url}"),
            ProgramLocator::Inline(_) => write!(f, "<inline>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64() {
        let encoded = BASE64.encode("OPENQASM 2.0;");
        let locator = ProgramLocator::from_base64(&encoded).unwrap();
        assert_eq!(locator, ProgramLocator::Inline("OPENQASM 2.0;".into()));
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        assert!(ProgramLocator::from_base64("!!not base64!!").is_err());
    }

    #[test]
    fn test_file_name_from_url() {
        let locator = ProgramLocator::url("https://host/algos/grover.qasm");
        assert_eq!(locator.file_name(), Some("grover.qasm"));

        let with_query = ProgramLocator::url("https://host/a/bell.quil?raw=1");
        assert_eq!(with_query.file_name(), Some("bell.quil"));

        let trailing = ProgramLocator::url("https://host/dir/");
        assert_eq!(trailing.file_name(), None);
    }

    #[test]
    fn test_inline_has_no_file_name() {
        assert_eq!(ProgramLocator::inline("x").file_name(), None);
    }
}
