//! Error types for the IR crate.

use thiserror::Error;

/// Errors raised while building or validating circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A qubit operand is not declared by any quantum register.
    #[error("Qubit index {index} out of range ({declared} qubits declared)")]
    QubitOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of declared qubits.
        declared: u32,
    },

    /// A classical bit operand is not declared by any classical register.
    #[error("Classical bit index {index} out of range ({declared} bits declared)")]
    ClbitOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of declared classical bits.
        declared: u32,
    },

    /// The same qubit appears twice in one operation.
    #[error("Duplicate qubit operand {0}")]
    DuplicateOperand(u32),

    /// Operand count does not match the gate arity.
    #[error("Gate {gate} expects {expected} qubit(s), found {found}")]
    ArityMismatch {
        /// Gate name.
        gate: String,
        /// Expected operand count.
        expected: u32,
        /// Provided operand count.
        found: usize,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
