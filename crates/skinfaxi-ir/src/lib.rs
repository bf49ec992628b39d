//! Canonical circuit representation for Skinfaxi.
//!
//! Every source representation (OpenQASM, Quil, native-SDK programs) is
//! normalized into the [`Circuit`] type defined here before anything else
//! happens to it: analysis, target compilation, or execution. A circuit is
//! a set of named quantum/classical registers plus an ordered operation
//! list; operand indices are flat and must be declared by the registers.
//!
//! # Example
//!
//! ```
//! use skinfaxi_ir::Circuit;
//!
//! let mut circuit = Circuit::new("bell");
//! circuit.add_qreg("q", 2);
//! circuit.add_creg("c", 2);
//! circuit.h(0).unwrap();
//! circuit.cx(0, 1).unwrap();
//! circuit.measure(0, 0).unwrap();
//! circuit.measure(1, 1).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth_without_barriers(), 3);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod op;
pub mod stats;

pub use circuit::{Circuit, Register};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, StandardGate};
pub use op::{OpKind, Operation};
pub use stats::CircuitStats;
