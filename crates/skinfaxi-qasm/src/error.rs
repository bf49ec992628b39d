//! Error types for QASM parsing.

use thiserror::Error;

/// Errors produced while parsing or emitting OpenQASM.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QasmError {
    /// The lexer hit an unrecognizable character sequence.
    #[error("Lexer error at byte {position}")]
    Lexer {
        /// Byte offset into the source.
        position: usize,
    },

    /// Input ended while more tokens were expected.
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    /// A token other than the expected one was found.
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the parser was looking for.
        expected: String,
        /// What it found instead.
        found: String,
    },

    /// The version declaration is malformed.
    #[error("Invalid OPENQASM version: {0}")]
    InvalidVersion(String),

    /// A register was referenced before being declared.
    #[error("Unknown register: {0}")]
    UnknownRegister(String),

    /// A register index exceeds the declared size.
    #[error("Index {index} out of range for register {register}[{size}]")]
    IndexOutOfRange {
        /// Register name.
        register: String,
        /// Offending index.
        index: u32,
        /// Declared size.
        size: u32,
    },

    /// Whole-register operands of different sizes cannot be broadcast.
    #[error("Cannot broadcast registers of sizes {0} and {1}")]
    BroadcastMismatch(u32, u32),

    /// A statement form the canonical circuit cannot represent.
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    /// An expression that does not evaluate to a number.
    #[error("Cannot evaluate expression: {0}")]
    BadExpression(String),

    /// The lowered circuit violated an IR invariant.
    #[error(transparent)]
    Ir(#[from] skinfaxi_ir::IrError),
}

/// Result type for QASM operations.
pub type QasmResult<T> = Result<T, QasmError>;
