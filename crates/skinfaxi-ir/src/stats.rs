//! Circuit statistics.
//!
//! The same tuple is computed twice per transpilation — once on the freshly
//! canonicalized circuit and once on the target-compiled circuit — and once
//! for plain analysis requests.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;

/// Aggregate statistics of a canonical circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    /// Number of declared qubits.
    pub width: u32,
    /// Circuit depth with barriers excluded from the critical path.
    pub depth: u32,
    /// Depth restricted to multi-qubit operations.
    pub multi_qubit_gate_depth: u32,
    /// Total number of operations (barriers included).
    pub total_operations: u32,
    /// Operations touching two or more qubits.
    pub multi_qubit_gates: u32,
    /// Measurement operations.
    pub measurement_operations: u32,
    /// Everything else: `total - multi_qubit - measurements`.
    pub single_qubit_gates: u32,
}

impl CircuitStats {
    /// Compute statistics for a circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn of(circuit: &Circuit) -> Self {
        let total = circuit.ops().len() as u32;
        let multi = circuit
            .ops()
            .iter()
            .filter(|op| op.is_multi_qubit())
            .count() as u32;
        let measurements = circuit
            .ops()
            .iter()
            .filter(|op| op.is_measure())
            .count() as u32;

        Self {
            width: circuit.num_qubits(),
            depth: circuit.depth_without_barriers(),
            multi_qubit_gate_depth: circuit.multi_qubit_depth(),
            total_operations: total,
            multi_qubit_gates: multi,
            measurement_operations: measurements,
            single_qubit_gates: total - multi - measurements,
        }
    }
}
