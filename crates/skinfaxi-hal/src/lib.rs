//! Target capability model for Skinfaxi.
//!
//! A *target* is something a circuit can be compiled for and executed on: a
//! local simulator, a named hosted device, or a proxy to a hosted provider.
//! This crate defines:
//!
//! - [`TargetProfile`] — the immutable capability descriptor (qubit limit,
//!   gate set, connectivity, exchange format),
//! - the [`Target`] trait — validate / compile / execute,
//! - [`CompileOutcome`] — the tagged result of target compilation; qubit
//!   overflow is distinguished from generic failure because retrying it is
//!   certain to fail again,
//! - [`Credentials`] — an explicit per-request credential value, built from
//!   typed parameters and threaded through resolution (never process-global),
//! - [`ProviderRegistry`] — the lookup table from provider name to
//!   [`TargetProvider`], so new providers are added by registration,
//! - [`Counts`] — measurement statistics returned by execution.

pub mod capability;
pub mod credentials;
pub mod error;
pub mod registry;
pub mod result;
pub mod target;

pub use capability::{GateSet, Topology};
pub use credentials::Credentials;
pub use error::{HalError, HalResult};
pub use registry::{ProviderRegistry, TargetProvider};
pub use result::Counts;
pub use target::{CompileOutcome, InvalidReason, Target, TargetProfile, ValidationReport};
