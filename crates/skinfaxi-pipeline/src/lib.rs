//! Program loading, canonicalization, and target adaptation for Skinfaxi.
//!
//! This crate owns the control logic between "a request names a program"
//! and "a circuit the target accepts":
//!
//! - [`RawProgram`] and the [`ProgramLoader`] contract (with [`HttpLoader`]
//!   for the textual formats),
//! - the canonicalizer ([`to_canonical`]) producing tagged outcomes,
//! - the best-effort precompiler ([`precompile`]) used as the single retry,
//! - the adaptation state machine ([`adapt_for_target`],
//!   [`canonicalize_program`]).
//!
//! # Example
//!
//! ```
//! use skinfaxi_pipeline::{RawProgram, canonicalize_program};
//!
//! let program = RawProgram::Qasm(
//!     "OPENQASM 2.0; qreg q[1]; h q[0];".into(),
//! );
//! let canonical = canonicalize_program(&program).unwrap();
//! assert_eq!(canonical.stats.width, 1);
//! assert_eq!(canonical.stats.depth, 1);
//! assert!(!canonical.precompiled);
//! ```

pub mod adapt;
pub mod canonical;
pub mod error;
pub mod loader;
pub mod precompile;
pub mod program;

pub use adapt::{AdaptReport, Canonicalized, adapt_for_target, canonicalize_program};
pub use canonical::{CanonicalOutcome, to_canonical};
pub use error::{AdaptError, PipelineError, PipelineResult};
pub use loader::{HttpLoader, LoadError, LoadedProgram, ProgramLoader, display_name};
pub use precompile::precompile;
pub use program::RawProgram;
