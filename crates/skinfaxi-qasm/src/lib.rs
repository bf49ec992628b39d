//! OpenQASM parser and emitter for Skinfaxi.
//!
//! Accepts both OpenQASM 2.0 (`qreg q[2];`, `measure q -> c;`) and the
//! OpenQASM 3.0 forms (`qubit[2] q;`, `c = measure q;`) of the constructs the
//! canonical circuit can represent. Gates outside the core vocabulary parse
//! into custom operations so the pipeline can classify them instead of
//! losing the offending name in a syntax error.
//!
//! # Example
//!
//! ```
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let circuit = skinfaxi_qasm::parse(qasm).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//!
//! let emitted = skinfaxi_qasm::emit(&circuit);
//! assert!(emitted.contains("cx q[0], q[1];"));
//! ```

mod emitter;
mod error;
mod lexer;
mod parser;

pub use emitter::emit;
pub use error::{QasmError, QasmResult};
pub use parser::parse;
