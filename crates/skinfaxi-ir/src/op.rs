//! Circuit operations: a gate or directive plus its operands.

use serde::{Deserialize, Serialize};

use crate::gate::Gate;

/// The kind of operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpKind {
    /// A quantum gate.
    Gate(Gate),
    /// Measurement into a classical bit.
    Measure,
    /// Reset a qubit to |0⟩.
    Reset,
    /// Barrier (synchronization directive, excluded from depth statistics).
    Barrier,
}

/// A complete operation with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// What the operation does.
    pub kind: OpKind,
    /// Qubit operands (flat indices).
    pub qubits: Vec<u32>,
    /// Classical bit operands (measure only).
    pub clbits: Vec<u32>,
}

impl Operation {
    /// Create a gate operation.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = u32>) -> Self {
        Self {
            kind: OpKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a measurement operation.
    pub fn measure(qubit: u32, clbit: u32) -> Self {
        Self {
            kind: OpKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Create a reset operation.
    pub fn reset(qubit: u32) -> Self {
        Self {
            kind: OpKind::Reset,
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// Create a barrier over the given qubits.
    pub fn barrier(qubits: impl IntoIterator<Item = u32>) -> Self {
        Self {
            kind: OpKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Name of this operation.
    pub fn name(&self) -> &str {
        match &self.kind {
            OpKind::Gate(g) => g.name(),
            OpKind::Measure => "measure",
            OpKind::Reset => "reset",
            OpKind::Barrier => "barrier",
        }
    }

    /// The gate, if this is a gate operation.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            OpKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Whether this is a gate operation.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, OpKind::Gate(_))
    }

    /// Whether this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, OpKind::Measure)
    }

    /// Whether this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, OpKind::Barrier)
    }

    /// Whether this is a reset.
    pub fn is_reset(&self) -> bool {
        matches!(self.kind, OpKind::Reset)
    }

    /// Whether this operation touches two or more qubits.
    ///
    /// Controlled gates, swaps, and multi-qubit custom boxes all count;
    /// barriers and measurements do not, regardless of operand count.
    pub fn is_multi_qubit(&self) -> bool {
        match &self.kind {
            OpKind::Gate(g) => g.num_qubits() >= 2,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{CustomGate, StandardGate};

    #[test]
    fn test_gate_operation() {
        let op = Operation::gate(StandardGate::H, [0]);
        assert!(op.is_gate());
        assert!(!op.is_multi_qubit());
        assert_eq!(op.name(), "h");
    }

    #[test]
    fn test_multi_qubit_tagging() {
        assert!(Operation::gate(StandardGate::CX, [0, 1]).is_multi_qubit());
        assert!(Operation::gate(StandardGate::Swap, [0, 1]).is_multi_qubit());
        assert!(Operation::gate(StandardGate::CCX, [0, 1, 2]).is_multi_qubit());
        // Multi-qubit custom boxes are tagged by arity.
        assert!(Operation::gate(CustomGate::new("box2", 2), [0, 1]).is_multi_qubit());
        // Barriers span qubits but are not multi-qubit gates.
        assert!(!Operation::barrier([0, 1, 2]).is_multi_qubit());
        assert!(!Operation::measure(0, 0).is_multi_qubit());
    }

    #[test]
    fn test_measure_operands() {
        let op = Operation::measure(2, 1);
        assert!(op.is_measure());
        assert_eq!(op.qubits, vec![2]);
        assert_eq!(op.clbits, vec![1]);
    }
}
