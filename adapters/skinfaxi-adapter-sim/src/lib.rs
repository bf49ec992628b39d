//! Local statevector simulator provider for Skinfaxi.
//!
//! Registers under the provider name `sim` and resolves the device
//! `statevector_simulator`: a noiseless statevector simulation of the full
//! canonical gate vocabulary, memory-bound at roughly 20 qubits. No
//! credentials are required.
//!
//! # Example
//!
//! ```
//! use skinfaxi_adapter_sim::SimTarget;
//! use skinfaxi_hal::{CompileOutcome, Target};
//! use skinfaxi_ir::Circuit;
//!
//! let target = SimTarget::new();
//! let report = target.validate(&Circuit::bell());
//! assert!(report.is_valid());
//! assert!(matches!(
//!     target.compile(&Circuit::bell()),
//!     CompileOutcome::Compiled(_)
//! ));
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEVICE_NAME, PROVIDER_NAME, SimProvider, SimTarget};
pub use statevector::Statevector;
