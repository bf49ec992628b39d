//! The target trait and its capability descriptor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use skinfaxi_ir::Circuit;
use skinfaxi_types::ExchangeFormat;

use crate::capability::{GateSet, Topology};
use crate::error::HalResult;
use crate::result::Counts;

/// Immutable capability descriptor of an execution target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetProfile {
    /// Provider the target belongs to.
    pub provider: String,
    /// Device name within the provider.
    pub device: String,
    /// Number of qubits the device hosts.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Qubit connectivity.
    pub topology: Topology,
    /// Maximum shots per execution.
    pub max_shots: u32,
    /// Whether this is a simulator rather than hardware.
    pub is_simulator: bool,
    /// Serialization format for compiled circuits.
    pub exchange_format: ExchangeFormat,
}

impl TargetProfile {
    /// Validate a circuit against this profile.
    pub fn validate(&self, circuit: &Circuit) -> ValidationReport {
        let mut reasons = vec![];

        let required = circuit.num_qubits();
        if required > self.num_qubits {
            reasons.push(InvalidReason::TooWide {
                required,
                limit: self.num_qubits,
            });
        }

        for op in circuit.ops() {
            if let Some(gate) = op.as_gate() {
                if !self.gate_set.contains(gate.name()) {
                    let name = gate.name().to_string();
                    if !reasons.iter().any(
                        |r| matches!(r, InvalidReason::UnsupportedGate { name: n } if *n == name),
                    ) {
                        reasons.push(InvalidReason::UnsupportedGate { name });
                    }
                }
            }
            if op.is_multi_qubit() && op.qubits.len() == 2 {
                let (q1, q2) = (op.qubits[0], op.qubits[1]);
                if !self.topology.is_connected(q1, q2)
                    && !reasons
                        .iter()
                        .any(|r| matches!(r, InvalidReason::Disconnected { .. }))
                {
                    reasons.push(InvalidReason::Disconnected { q1, q2 });
                }
            }
        }

        ValidationReport { reasons }
    }
}

/// Why a circuit failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidReason {
    /// The circuit uses more qubits than the device hosts.
    TooWide {
        /// Qubits the circuit declares.
        required: u32,
        /// Qubits the device hosts.
        limit: u32,
    },
    /// A gate outside the target's supported set.
    UnsupportedGate {
        /// Gate name.
        name: String,
    },
    /// A two-qubit gate between unconnected qubits.
    Disconnected {
        /// First qubit.
        q1: u32,
        /// Second qubit.
        q2: u32,
    },
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::TooWide { required, limit } => {
                write!(f, "circuit needs {required} qubits, device has {limit}")
            }
            InvalidReason::UnsupportedGate { name } => {
                write!(f, "gate '{name}' not supported")
            }
            InvalidReason::Disconnected { q1, q2 } => {
                write!(f, "qubits {q1} and {q2} are not connected")
            }
        }
    }
}

/// Result of validating a circuit against a target.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Everything wrong with the circuit; empty means valid.
    pub reasons: Vec<InvalidReason>,
}

impl ValidationReport {
    /// Whether the circuit can be submitted as-is.
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Whether every failure is a placement predicate (width or
    /// connectivity) that a default qubit mapping could repair.
    pub fn is_placement_only(&self) -> bool {
        !self.reasons.is_empty()
            && self.reasons.iter().all(|r| {
                matches!(
                    r,
                    InvalidReason::TooWide { .. } | InvalidReason::Disconnected { .. }
                )
            })
    }

    /// Human-readable summary of the failure reasons.
    pub fn describe(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Outcome of target compilation.
///
/// Qubit overflow gets its own tag because it is a property of the immutable
/// target and the requested circuit width — retrying cannot succeed, unlike
/// translation gaps which one precompile pass may resolve.
#[derive(Debug, Clone)]
pub enum CompileOutcome {
    /// Compilation produced a circuit for this target.
    Compiled(Circuit),
    /// The circuit needs more qubits than the target hosts. Never retried.
    TooManyQubits {
        /// Qubits the circuit declares.
        required: u32,
        /// Qubits the device hosts.
        limit: u32,
    },
    /// Compilation failed for an unclassified reason.
    Failed(String),
}

/// An execution target: a simulator or device a circuit can run on.
#[async_trait]
pub trait Target: Send + Sync {
    /// The capability descriptor.
    fn profile(&self) -> &TargetProfile;

    /// Validate a circuit against this target's constraints.
    fn validate(&self, circuit: &Circuit) -> ValidationReport {
        self.profile().validate(circuit)
    }

    /// Compile a circuit for this target.
    fn compile(&self, circuit: &Circuit) -> CompileOutcome;

    /// Execute a circuit, returning measurement counts.
    async fn execute(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(num_qubits: u32, gate_set: GateSet, topology: Topology) -> TargetProfile {
        TargetProfile {
            provider: "test".into(),
            device: "test-device".into(),
            num_qubits,
            gate_set,
            topology,
            max_shots: 10_000,
            is_simulator: true,
            exchange_format: ExchangeFormat::Qasm,
        }
    }

    #[test]
    fn test_validate_accepts_fitting_circuit() {
        let profile = profile(5, GateSet::universal(), Topology::any_to_any());
        let report = profile.validate(&Circuit::bell());
        assert!(report.is_valid());
    }

    #[test]
    fn test_validate_rejects_wide_circuit() {
        let profile = profile(1, GateSet::universal(), Topology::any_to_any());
        let report = profile.validate(&Circuit::bell());
        assert!(!report.is_valid());
        assert!(matches!(
            report.reasons[0],
            InvalidReason::TooWide {
                required: 2,
                limit: 1
            }
        ));
        assert!(report.is_placement_only());
    }

    #[test]
    fn test_validate_rejects_unsupported_gate() {
        let profile = profile(5, GateSet::rigetti(), Topology::any_to_any());
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit.gate(skinfaxi_ir::StandardGate::CCX, [0, 1, 2]).unwrap();

        let report = profile.validate(&circuit);
        assert!(matches!(
            &report.reasons[0],
            InvalidReason::UnsupportedGate { name } if name == "ccx"
        ));
        assert!(!report.is_placement_only());
    }

    #[test]
    fn test_validate_reports_disconnected_pair_once() {
        let profile = profile(4, GateSet::universal(), Topology::linear(4));
        let mut circuit = Circuit::with_size("t", 4, 0);
        circuit.cx(0, 3).unwrap();
        circuit.cx(0, 2).unwrap();

        let report = profile.validate(&circuit);
        assert_eq!(report.reasons.len(), 1);
        assert!(report.is_placement_only());
    }

    #[test]
    fn test_empty_report_is_not_placement_only() {
        let report = ValidationReport::default();
        assert!(report.is_valid());
        assert!(!report.is_placement_only());
    }
}
