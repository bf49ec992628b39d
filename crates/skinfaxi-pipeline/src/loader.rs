//! Program loaders.
//!
//! A loader turns a program locator into a raw program plus a display name.
//! The [`ProgramLoader`] trait is the full contract, including the
//! post-processing entry used by correlation chaining; [`HttpLoader`] is the
//! bundled implementation covering the textual circuit formats.
//!
//! Executable-source languages (Qiskit, pyQuil) are representable but the
//! bundled loader refuses them: running downloaded code requires a sandboxed
//! loader implementation supplied by the host, and no such capability is
//! built in here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument};

use skinfaxi_types::{ProgramLocator, SourceLanguage, TypedParams};

use crate::program::RawProgram;

/// Errors produced while obtaining a program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// Neither a URL nor inline data was supplied.
    #[error("No implementation specified")]
    NoImplementation,

    /// The locator URL could not be fetched.
    #[error("Could not fetch {url}: {reason}")]
    Unreachable {
        /// The URL that failed.
        url: String,
        /// Why it failed.
        reason: String,
    },

    /// The remote host rejected the request.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The supplied bearer token carries the scheme prefix.
    #[error("The bearer token must not start with \"Bearer\"")]
    BearerPrefix,

    /// The language denotes executable source this loader will not run.
    #[error("{0} implementations are executable source; a sandboxed loader is required")]
    SandboxRequired(SourceLanguage),

    /// The source defines no recognized circuit-producing binding.
    #[error("Implementation defines no recognized circuit binding")]
    NoCircuitBinding,

    /// The post-processing entry point failed.
    #[error("Post-processing failed: {0}")]
    PostProcessing(String),
}

/// A successfully loaded program.
#[derive(Debug, Clone)]
pub struct LoadedProgram {
    /// The raw program.
    pub program: RawProgram,
    /// Short name for logs and error messages.
    pub display_name: String,
}

/// The program-loader contract.
///
/// `load` produces exactly one raw program per successful call. `post_process`
/// re-enters the same implementation after execution, passing the merged
/// parameters (including the measurement counts), and returns an arbitrary
/// JSON value instead of a circuit.
#[async_trait]
pub trait ProgramLoader: Send + Sync {
    /// Obtain a raw program from a locator.
    async fn load(
        &self,
        locator: &ProgramLocator,
        language: SourceLanguage,
        params: &TypedParams,
        bearer_token: Option<&str>,
    ) -> Result<LoadedProgram, LoadError>;

    /// Invoke the implementation's post-processing entry point.
    async fn post_process(
        &self,
        locator: &ProgramLocator,
        language: SourceLanguage,
        params: &TypedParams,
        bearer_token: Option<&str>,
    ) -> Result<serde_json::Value, LoadError>;
}

/// Display name for a locator.
///
/// URL locators name themselves after the file matching the language's
/// extension (`.../grover.qasm` → `grover.qasm`); a URL without such a file
/// is `"undefined"` and inline payloads are `"untitled"`.
pub fn display_name(locator: &ProgramLocator, language: SourceLanguage) -> String {
    match locator {
        ProgramLocator::Url(_) => locator
            .file_name()
            .filter(|name| {
                name.rsplit('.')
                    .next()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(language.file_extension()))
            })
            .map_or_else(|| "undefined".to_string(), ToString::to_string),
        ProgramLocator::Inline(_) => "untitled".to_string(),
    }
}

/// Loader for the textual circuit formats, fetching URLs over HTTP(S).
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    /// Create a loader with sane request timeouts.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    #[instrument(skip(self, bearer_token))]
    async fn fetch_text(&self, url: &str, bearer_token: Option<&str>) -> Result<String, LoadError> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer_token {
            if token.starts_with("Bearer") {
                return Err(LoadError::BearerPrefix);
            }
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let unreachable = |reason: String| LoadError::Unreachable {
            url: url.to_string(),
            reason,
        };

        let response = request.send().await.map_err(|e| unreachable(e.to_string()))?;
        match response.status() {
            status if status.is_success() => {
                debug!("Fetched implementation from {}", url);
                response.text().await.map_err(|e| unreachable(e.to_string()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(LoadError::Unauthorized(url.to_string()))
            }
            status => Err(unreachable(format!("HTTP status {status}"))),
        }
    }
}

impl Default for HttpLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgramLoader for HttpLoader {
    async fn load(
        &self,
        locator: &ProgramLocator,
        language: SourceLanguage,
        _params: &TypedParams,
        bearer_token: Option<&str>,
    ) -> Result<LoadedProgram, LoadError> {
        if language.is_executable_source() {
            return Err(LoadError::SandboxRequired(language));
        }

        let text = match locator {
            ProgramLocator::Url(url) => self.fetch_text(url, bearer_token).await?,
            ProgramLocator::Inline(text) => text.clone(),
        };

        let program = match language {
            SourceLanguage::OpenQasm => RawProgram::Qasm(text),
            SourceLanguage::Quil => RawProgram::Quil(text),
            other => return Err(LoadError::SandboxRequired(other)),
        };

        Ok(LoadedProgram {
            program,
            display_name: display_name(locator, language),
        })
    }

    async fn post_process(
        &self,
        _locator: &ProgramLocator,
        language: SourceLanguage,
        _params: &TypedParams,
        _bearer_token: Option<&str>,
    ) -> Result<serde_json::Value, LoadError> {
        // Post-processing means running implementation code, which only a
        // sandboxed loader may do.
        Err(LoadError::SandboxRequired(language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_matches_extension() {
        let locator = ProgramLocator::url("https://host/algos/grover.qasm");
        assert_eq!(display_name(&locator, SourceLanguage::OpenQasm), "grover.qasm");
        // The Quil extension does not match a .qasm file.
        assert_eq!(display_name(&locator, SourceLanguage::Quil), "undefined");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let no_file = ProgramLocator::url("https://host/algos/");
        assert_eq!(display_name(&no_file, SourceLanguage::OpenQasm), "undefined");

        let inline = ProgramLocator::inline("OPENQASM 2.0;");
        assert_eq!(display_name(&inline, SourceLanguage::OpenQasm), "untitled");
    }

    #[tokio::test]
    async fn test_inline_load_needs_no_network() {
        let loader = HttpLoader::new();
        let locator = ProgramLocator::inline("OPENQASM 2.0; qreg q[1]; h q[0];");
        let loaded = loader
            .load(&locator, SourceLanguage::OpenQasm, &TypedParams::new(), None)
            .await
            .unwrap();
        assert_eq!(loaded.display_name, "untitled");
        assert!(matches!(loaded.program, RawProgram::Qasm(_)));
    }

    #[tokio::test]
    async fn test_executable_source_refused() {
        let loader = HttpLoader::new();
        let locator = ProgramLocator::url("https://host/shor.py");
        let err = loader
            .load(&locator, SourceLanguage::Qiskit, &TypedParams::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::SandboxRequired(SourceLanguage::Qiskit)));
    }

    #[tokio::test]
    async fn test_bearer_prefix_rejected() {
        let loader = HttpLoader::new();
        let locator = ProgramLocator::url("https://host/algos/grover.qasm");
        let err = loader
            .load(
                &locator,
                SourceLanguage::OpenQasm,
                &TypedParams::new(),
                Some("Bearer abc123"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::BearerPrefix));
    }
}
