//! Error types for the compile crate.

use thiserror::Error;

/// Errors raised by compilation passes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A pass produced an operation that violates an IR invariant.
    #[error(transparent)]
    Ir(#[from] skinfaxi_ir::IrError),
}

/// Result type for compilation passes.
pub type CompileResult<T> = Result<T, CompileError>;
