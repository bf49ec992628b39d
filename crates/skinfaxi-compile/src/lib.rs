//! Target compilation passes for Skinfaxi circuits.
//!
//! Two passes cover what the adaptation pipeline needs:
//!
//! - [`BasisTranslation`] rewrites standard gates into a target's supported
//!   set using a fixed identity table,
//! - [`DefaultLayout`] compacts qubit indices in first-use order, repairing
//!   placements lost in a lossy exchange-format round trip.
//!
//! [`compile_for`] combines the width check and basis translation into the
//! [`CompileOutcome`] shape the target trait expects; adapters call it from
//! their `compile` implementations.

pub mod error;
pub mod layout;
pub mod pass;
pub mod translate;

pub use error::{CompileError, CompileResult};
pub use layout::DefaultLayout;
pub use pass::{Pass, PassManager};
pub use translate::BasisTranslation;

use skinfaxi_hal::{CompileOutcome, TargetProfile};
use skinfaxi_ir::Circuit;

/// Compile a circuit for a target profile.
///
/// Checks the qubit limit first: overflow is a property of the immutable
/// target and the circuit width, so it is reported as its own outcome and
/// never retried. Everything else runs through basis translation; gates that
/// survive untranslated are left for validation to report.
pub fn compile_for(profile: &TargetProfile, circuit: &Circuit) -> CompileOutcome {
    let required = circuit.num_qubits();
    if required > profile.num_qubits {
        return CompileOutcome::TooManyQubits {
            required,
            limit: profile.num_qubits,
        };
    }

    let mut compiled = circuit.clone();
    let mut manager = PassManager::new();
    manager.add_pass(BasisTranslation::new(profile.gate_set.clone()));
    match manager.run(&mut compiled) {
        Ok(()) => CompileOutcome::Compiled(compiled),
        Err(e) => CompileOutcome::Failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfaxi_hal::{GateSet, Topology};
    use skinfaxi_types::ExchangeFormat;

    fn profile(num_qubits: u32, gate_set: GateSet) -> TargetProfile {
        TargetProfile {
            provider: "test".into(),
            device: "dev".into(),
            num_qubits,
            gate_set,
            topology: Topology::any_to_any(),
            max_shots: 10_000,
            is_simulator: true,
            exchange_format: ExchangeFormat::Qasm,
        }
    }

    #[test]
    fn test_compile_reports_qubit_overflow() {
        let profile = profile(5, GateSet::universal());
        let circuit = Circuit::ghz(20);
        assert!(matches!(
            compile_for(&profile, &circuit),
            CompileOutcome::TooManyQubits {
                required: 20,
                limit: 5
            }
        ));
    }

    #[test]
    fn test_compile_translates_to_target_set() {
        let profile = profile(5, GateSet::rigetti());
        let circuit = Circuit::bell();

        let CompileOutcome::Compiled(compiled) = compile_for(&profile, &circuit) else {
            panic!("expected compiled circuit");
        };
        assert!(profile.validate(&compiled).is_valid());
    }

    #[test]
    fn test_compile_is_identity_on_valid_input() {
        let profile = profile(5, GateSet::universal());
        let circuit = Circuit::bell();

        let CompileOutcome::Compiled(compiled) = compile_for(&profile, &circuit) else {
            panic!("expected compiled circuit");
        };
        assert_eq!(compiled, circuit);
    }
}
