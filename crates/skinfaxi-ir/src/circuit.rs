//! The canonical circuit type.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::op::{OpKind, Operation};

/// A named register of qubits or classical bits.
///
/// Registers partition the flat index space in declaration order: the first
/// register owns indices `0..size`, the next one continues from there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// Register name.
    pub name: String,
    /// Number of bits in the register.
    pub size: u32,
}

impl Register {
    /// Create a new register.
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// The canonical, SDK-agnostic circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    qregs: Vec<Register>,
    cregs: Vec<Register>,
    ops: Vec<Operation>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qregs: vec![],
            cregs: vec![],
            ops: vec![],
        }
    }

    /// Create a circuit with a single anonymous register pair.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.add_qreg("q", num_qubits);
        }
        if num_clbits > 0 {
            circuit.add_creg("c", num_clbits);
        }
        circuit
    }

    /// Declare a quantum register. Returns the first flat index it owns.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> u32 {
        let start = self.num_qubits();
        self.qregs.push(Register::new(name, size));
        start
    }

    /// Declare a classical register. Returns the first flat index it owns.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> u32 {
        let start = self.num_clbits();
        self.cregs.push(Register::new(name, size));
        start
    }

    /// Append an operation, validating its operands.
    pub fn push(&mut self, op: Operation) -> IrResult<()> {
        self.check_operands(&op)?;
        self.ops.push(op);
        Ok(())
    }

    fn check_operands(&self, op: &Operation) -> IrResult<()> {
        let declared_q = self.num_qubits();
        let declared_c = self.num_clbits();

        for (i, &q) in op.qubits.iter().enumerate() {
            if q >= declared_q {
                return Err(IrError::QubitOutOfRange {
                    index: q,
                    declared: declared_q,
                });
            }
            if op.qubits[..i].contains(&q) {
                return Err(IrError::DuplicateOperand(q));
            }
        }
        for &c in &op.clbits {
            if c >= declared_c {
                return Err(IrError::ClbitOutOfRange {
                    index: c,
                    declared: declared_c,
                });
            }
        }

        if let OpKind::Gate(gate) = &op.kind {
            let expected = gate.num_qubits();
            if op.qubits.len() != expected as usize {
                return Err(IrError::ArityMismatch {
                    gate: gate.name().to_string(),
                    expected,
                    found: op.qubits.len(),
                });
            }
        }
        Ok(())
    }

    /// Re-validate every operation against the declared registers.
    pub fn validate(&self) -> IrResult<()> {
        for op in &self.ops {
            self.check_operands(op)?;
        }
        Ok(())
    }

    // =========================================================================
    // Convenience builders
    // =========================================================================

    /// Apply a gate to the given qubits.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = u32>,
    ) -> IrResult<&mut Self> {
        self.push(Operation::gate(gate, qubits))?;
        Ok(self)
    }

    /// Apply a Hadamard gate.
    pub fn h(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [qubit])
    }

    /// Apply a Pauli-X gate.
    pub fn x(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [qubit])
    }

    /// Apply an Rx rotation.
    pub fn rx(&mut self, theta: f64, qubit: u32) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rx(theta), [qubit])
    }

    /// Apply an Ry rotation.
    pub fn ry(&mut self, theta: f64, qubit: u32) -> IrResult<&mut Self> {
        self.gate(StandardGate::Ry(theta), [qubit])
    }

    /// Apply an Rz rotation.
    pub fn rz(&mut self, theta: f64, qubit: u32) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rz(theta), [qubit])
    }

    /// Apply a CNOT gate.
    pub fn cx(&mut self, control: u32, target: u32) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    /// Apply a CZ gate.
    pub fn cz(&mut self, control: u32, target: u32) -> IrResult<&mut Self> {
        self.gate(StandardGate::CZ, [control, target])
    }

    /// Apply a SWAP gate.
    pub fn swap(&mut self, q1: u32, q2: u32) -> IrResult<&mut Self> {
        self.gate(StandardGate::Swap, [q1, q2])
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: u32, clbit: u32) -> IrResult<&mut Self> {
        self.push(Operation::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure every qubit into the classical bit of the same index,
    /// growing the last classical register if needed.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let qubits = self.num_qubits();
        let clbits = self.num_clbits();
        if clbits < qubits {
            self.add_creg("meas", qubits - clbits);
        }
        for q in 0..qubits {
            self.push(Operation::measure(q, q))?;
        }
        Ok(self)
    }

    /// Apply a barrier over the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = u32>) -> IrResult<&mut Self> {
        self.push(Operation::barrier(qubits))?;
        Ok(self)
    }

    /// Apply a barrier over all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<u32> = (0..self.num_qubits()).collect();
        self.barrier(qubits)
    }

    /// Reset a qubit.
    pub fn reset(&mut self, qubit: u32) -> IrResult<&mut Self> {
        self.push(Operation::reset(qubit))?;
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Total declared qubits.
    pub fn num_qubits(&self) -> u32 {
        self.qregs.iter().map(|r| r.size).sum()
    }

    /// Total declared classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.cregs.iter().map(|r| r.size).sum()
    }

    /// Quantum registers in declaration order.
    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    /// Classical registers in declaration order.
    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    /// Operations in program order.
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    /// Mutable access to the operation list (compiler passes only).
    pub fn ops_mut(&mut self) -> &mut Vec<Operation> {
        &mut self.ops
    }

    /// Replace the operation list, validating each entry.
    pub fn set_ops(&mut self, ops: Vec<Operation>) -> IrResult<()> {
        for op in &ops {
            self.check_operands(op)?;
        }
        self.ops = ops;
        Ok(())
    }

    /// Lowercase every register name.
    ///
    /// Some execution targets reject uppercase register identifiers, so this
    /// runs once on every circuit before submission.
    pub fn normalize_register_names(&mut self) {
        for reg in self.qregs.iter_mut().chain(self.cregs.iter_mut()) {
            reg.name = reg.name.to_lowercase();
        }
    }

    // =========================================================================
    // Depth
    // =========================================================================

    /// Critical-path length counting every operation, barriers included.
    pub fn depth(&self) -> u32 {
        self.depth_filtered(|_| true)
    }

    /// Critical-path length with barriers excluded.
    ///
    /// This is the depth reported in circuit statistics.
    pub fn depth_without_barriers(&self) -> u32 {
        self.depth_filtered(|op| !op.is_barrier())
    }

    /// Critical-path length restricted to multi-qubit operations.
    pub fn multi_qubit_depth(&self) -> u32 {
        self.depth_filtered(Operation::is_multi_qubit)
    }

    /// Depth over the subset of operations selected by `keep`.
    ///
    /// Standard front-layer counting for a flat operation list: each kept
    /// operation lands one layer after the deepest wire it touches.
    fn depth_filtered(&self, keep: impl Fn(&Operation) -> bool) -> u32 {
        let mut qubit_front = vec![0u32; self.num_qubits() as usize];
        let mut clbit_front = vec![0u32; self.num_clbits() as usize];
        let mut max = 0u32;

        for op in &self.ops {
            if !keep(op) {
                continue;
            }
            let layer = op
                .qubits
                .iter()
                .map(|&q| qubit_front[q as usize])
                .chain(op.clbits.iter().map(|&c| clbit_front[c as usize]))
                .max()
                .unwrap_or(0)
                + 1;
            for &q in &op.qubits {
                qubit_front[q as usize] = layer;
            }
            for &c in &op.clbits {
                clbit_front[c as usize] = layer;
            }
            max = max.max(layer);
        }
        max
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// A bell-pair circuit with measurements.
    pub fn bell() -> Self {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(0)
            .and_then(|c| c.cx(0, 1))
            .and_then(|c| c.measure(0, 0))
            .and_then(|c| c.measure(1, 1))
            .expect("bell circuit operands are in range");
        circuit
    }

    /// A GHZ-state circuit over `n` qubits with measurements.
    pub fn ghz(n: u32) -> Self {
        let mut circuit = Self::with_size("ghz", n, n);
        if n == 0 {
            return circuit;
        }
        circuit.h(0).expect("qubit 0 declared");
        for i in 0..n - 1 {
            circuit.cx(i, i + 1).expect("chain operands in range");
        }
        for i in 0..n {
            circuit.measure(i, i).expect("measure operands in range");
        }
        circuit
    }
}
