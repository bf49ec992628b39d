//! Source-language and exchange-format tags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for an unrecognized language label.
#[derive(Debug, Error)]
#[error("Unknown source language: {0}")]
pub struct UnknownLanguage(pub String);

/// The declared representation of an incoming program.
///
/// `OpenQasm` and `Quil` are textual circuit formats parsed in-process.
/// `Qiskit` and `PyQuil` denote executable native-SDK sources; only a
/// sandboxed program-loader implementation provided by the host can
/// materialize those into a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    /// OpenQASM 2.0 / 3.0 text.
    OpenQasm,
    /// Quil text.
    Quil,
    /// A Qiskit program (executable source).
    Qiskit,
    /// A pyQuil program (executable source).
    PyQuil,
}

impl SourceLanguage {
    /// File extension used to recognize implementations of this language.
    pub fn file_extension(&self) -> &'static str {
        match self {
            SourceLanguage::OpenQasm => "qasm",
            SourceLanguage::Quil => "quil",
            SourceLanguage::Qiskit | SourceLanguage::PyQuil => "py",
        }
    }

    /// Whether programs in this language are executable source code rather
    /// than circuit text.
    pub fn is_executable_source(&self) -> bool {
        matches!(self, SourceLanguage::Qiskit | SourceLanguage::PyQuil)
    }
}

impl std::str::FromStr for SourceLanguage {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openqasm" | "qasm" => Ok(SourceLanguage::OpenQasm),
            "quil" => Ok(SourceLanguage::Quil),
            "qiskit" => Ok(SourceLanguage::Qiskit),
            "pyquil" => Ok(SourceLanguage::PyQuil),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

impl std::fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SourceLanguage::OpenQasm => "OpenQASM",
            SourceLanguage::Quil => "Quil",
            SourceLanguage::Qiskit => "Qiskit",
            SourceLanguage::PyQuil => "PyQuil",
        };
        write!(f, "{label}")
    }
}

/// Serialization format for compiled circuits handed back to clients or
/// resubmitted for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeFormat {
    /// OpenQASM text (the primary exchange format).
    Qasm,
    /// Quil text (used by Rigetti devices; loses register placement).
    Quil,
}

impl ExchangeFormat {
    /// Label reported in transpile responses.
    pub fn label(&self) -> &'static str {
        match self {
            ExchangeFormat::Qasm => "OpenQASM",
            ExchangeFormat::Quil => "Quil",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            SourceLanguage::from_str("OpenQASM").unwrap(),
            SourceLanguage::OpenQasm
        );
        assert_eq!(
            SourceLanguage::from_str("QUIL").unwrap(),
            SourceLanguage::Quil
        );
        assert_eq!(
            SourceLanguage::from_str("qiskit").unwrap(),
            SourceLanguage::Qiskit
        );
        assert!(SourceLanguage::from_str("fortran").is_err());
    }

    #[test]
    fn test_executable_source_flag() {
        assert!(!SourceLanguage::OpenQasm.is_executable_source());
        assert!(!SourceLanguage::Quil.is_executable_source());
        assert!(SourceLanguage::Qiskit.is_executable_source());
        assert!(SourceLanguage::PyQuil.is_executable_source());
    }

    #[test]
    fn test_exchange_format_labels() {
        assert_eq!(ExchangeFormat::Qasm.label(), "OpenQASM");
        assert_eq!(ExchangeFormat::Quil.label(), "Quil");
    }
}
