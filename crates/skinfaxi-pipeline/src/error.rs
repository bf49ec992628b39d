//! Error types for the pipeline crate.

use thiserror::Error;

use crate::loader::LoadError;

/// Errors raised while loading or parsing programs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The loader could not produce a program.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// OpenQASM text failed to parse.
    #[error("OpenQASM parse error: {0}")]
    Qasm(#[from] skinfaxi_qasm::QasmError),

    /// Quil text failed to parse.
    #[error("Quil parse error: {0}")]
    Quil(#[from] skinfaxi_quil::QuilError),

    /// A circuit violated an IR invariant.
    #[error(transparent)]
    Ir(#[from] skinfaxi_ir::IrError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Terminal outcomes of the adaptation state machine.
///
/// Every variant is a classified failure; retryable conditions never reach
/// this type because the state machine consumes its single retry internally.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdaptError {
    /// A construct survived precompilation that the canonical form cannot
    /// express.
    #[error("Unsupported construct: {construct}")]
    Unsupported {
        /// Name of the offending construct.
        construct: String,
    },

    /// The circuit needs more qubits than the target hosts. Never retried:
    /// the limit is a property of the immutable target.
    #[error("too many qubits required")]
    TooManyQubits {
        /// Qubits the circuit declares.
        required: u32,
        /// Qubits the target hosts.
        limit: u32,
    },

    /// The circuit is still invalid after compilation and the retry.
    #[error("Circuit invalid after compilation: {0}")]
    StillInvalid(String),

    /// Target compilation failed for an unclassified reason.
    #[error("Compilation failed: {0}")]
    CompileFailed(String),

    /// Loading or parsing failed before adaptation could start.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
