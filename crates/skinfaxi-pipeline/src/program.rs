//! Raw programs.
//!
//! A raw program is what the loader hands the pipeline: circuit text in one
//! of the textual formats, or an already-materialized circuit produced by a
//! native-SDK loader. A raw program is not yet canonical — text may fail to
//! parse, and a circuit may still carry operations outside the core
//! vocabulary.

use skinfaxi_ir::Circuit;

/// A program as delivered by a loader, before canonicalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawProgram {
    /// OpenQASM source text.
    Qasm(String),
    /// Quil source text.
    Quil(String),
    /// A circuit value from a native loader; may contain custom operations.
    Circuit(Circuit),
}

impl RawProgram {
    /// Label of the underlying representation, for logs and errors.
    pub fn representation(&self) -> &'static str {
        match self {
            RawProgram::Qasm(_) => "OpenQASM",
            RawProgram::Quil(_) => "Quil",
            RawProgram::Circuit(_) => "circuit",
        }
    }
}

impl From<Circuit> for RawProgram {
    fn from(circuit: Circuit) -> Self {
        RawProgram::Circuit(circuit)
    }
}
