//! Quil parser and emitter for Skinfaxi.
//!
//! Quil is the second circuit exchange format, used by Rigetti devices.
//! Unlike QASM it is deliberately flat: qubits are bare indices and the only
//! classical storage is the memory declared with `DECLARE`. A round trip
//! through Quil therefore loses register structure and barriers — the
//! default-layout repair pass exists to recover from exactly that.
//!
//! # Example
//!
//! ```
//! let quil = "DECLARE ro BIT[2]\nH 0\nCNOT 0 1\nMEASURE 0 ro[0]\nMEASURE 1 ro[1]\n";
//! let circuit = skinfaxi_quil::parse(quil).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//!
//! let emitted = skinfaxi_quil::emit(&circuit);
//! assert!(emitted.contains("CNOT 0 1"));
//! ```

mod emitter;
mod parser;

pub use emitter::emit;
pub use parser::parse;

use thiserror::Error;

/// Errors produced while parsing Quil.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuilError {
    /// A line that is not a recognizable Quil instruction.
    #[error("Malformed Quil at line {line}: {text}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },

    /// A DECLARE with a memory type other than BIT.
    #[error("Unsupported memory declaration at line {line}: {text}")]
    UnsupportedDeclaration {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },

    /// A parameter expression that does not evaluate to a number.
    #[error("Cannot evaluate parameter: {0}")]
    BadParameter(String),

    /// A memory reference to an undeclared region.
    #[error("Unknown memory region: {0}")]
    UnknownMemory(String),

    /// The lowered circuit violated an IR invariant.
    #[error(transparent)]
    Ir(#[from] skinfaxi_ir::IrError),
}

/// Result type for Quil operations.
pub type QuilResult<T> = Result<T, QuilError>;
