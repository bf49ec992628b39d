//! Basis translation.
//!
//! Rewrites standard gates into a target's supported set using a fixed
//! identity table (equalities hold up to global phase). Rotations are the
//! terminal vocabulary: `rx`/`rz` are never expanded further. Gates with no
//! rewrite rule, and all custom gates, are left in place so that validation
//! reports them instead of the translator guessing.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use skinfaxi_hal::GateSet;
use skinfaxi_ir::{Circuit, Gate, OpKind, Operation, StandardGate};

use crate::error::CompileResult;
use crate::pass::Pass;

/// Cap on rule chaining (`ccx` → `cx`/`t` → rotations is the deepest chain).
const MAX_REWRITE_DEPTH: usize = 8;

/// Rewrites gates into a target's supported set.
pub struct BasisTranslation {
    gates: GateSet,
}

impl BasisTranslation {
    /// Create a translation pass targeting the given gate set.
    pub fn new(gates: GateSet) -> Self {
        Self { gates }
    }

    fn translate_into(&self, op: &Operation, depth: usize, out: &mut Vec<Operation>) {
        let OpKind::Gate(gate) = &op.kind else {
            out.push(op.clone());
            return;
        };
        if self.gates.contains(gate.name()) || depth >= MAX_REWRITE_DEPTH {
            out.push(op.clone());
            return;
        }
        let Gate::Standard(standard) = gate else {
            // Custom gates have no known identity.
            out.push(op.clone());
            return;
        };
        match expand(standard, &op.qubits) {
            Some(expansion) => {
                for sub in expansion {
                    self.translate_into(&sub, depth + 1, out);
                }
            }
            None => out.push(op.clone()),
        }
    }
}

impl Pass for BasisTranslation {
    fn name(&self) -> &str {
        "basis-translation"
    }

    fn run(&self, circuit: &mut Circuit) -> CompileResult<()> {
        let mut out = Vec::with_capacity(circuit.ops().len());
        for op in circuit.ops() {
            self.translate_into(op, 0, &mut out);
        }
        circuit.set_ops(out)?;
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit) -> bool {
        circuit
            .ops()
            .iter()
            .any(|op| op.as_gate().is_some_and(|g| !self.gates.contains(g.name())))
    }
}

fn gate_op(gate: StandardGate, qubits: &[u32]) -> Operation {
    Operation::gate(gate, qubits.iter().copied())
}

/// One rewrite step for a single gate. `None` means no rule exists.
#[allow(clippy::too_many_lines)]
fn expand(gate: &StandardGate, q: &[u32]) -> Option<Vec<Operation>> {
    use StandardGate as G;

    let ops = match *gate {
        G::I => vec![],
        G::X => vec![gate_op(G::Rx(PI), q)],
        G::Y => vec![gate_op(G::Ry(PI), q)],
        G::Z => vec![gate_op(G::Rz(PI), q)],
        G::S => vec![gate_op(G::Rz(FRAC_PI_2), q)],
        G::Sdg => vec![gate_op(G::Rz(-FRAC_PI_2), q)],
        G::T => vec![gate_op(G::Rz(FRAC_PI_4), q)],
        G::Tdg => vec![gate_op(G::Rz(-FRAC_PI_4), q)],
        G::P(theta) => vec![gate_op(G::Rz(theta), q)],
        G::SX => vec![gate_op(G::Rx(FRAC_PI_2), q)],
        G::SXdg => vec![gate_op(G::Rx(-FRAC_PI_2), q)],
        G::H => vec![
            gate_op(G::Rz(FRAC_PI_2), q),
            gate_op(G::SX, q),
            gate_op(G::Rz(FRAC_PI_2), q),
        ],
        G::Ry(theta) => vec![
            gate_op(G::Rz(-FRAC_PI_2), q),
            gate_op(G::Rx(theta), q),
            gate_op(G::Rz(FRAC_PI_2), q),
        ],
        G::U(theta, phi, lambda) => vec![
            gate_op(G::Rz(lambda), q),
            gate_op(G::Ry(theta), q),
            gate_op(G::Rz(phi), q),
        ],
        // rx/rz are the terminal single-qubit vocabulary.
        G::Rx(_) | G::Rz(_) => return None,

        G::CX => vec![
            gate_op(G::H, &[q[1]]),
            gate_op(G::CZ, q),
            gate_op(G::H, &[q[1]]),
        ],
        G::CZ => vec![
            gate_op(G::H, &[q[1]]),
            gate_op(G::CX, q),
            gate_op(G::H, &[q[1]]),
        ],
        G::CY => vec![
            gate_op(G::Sdg, &[q[1]]),
            gate_op(G::CX, q),
            gate_op(G::S, &[q[1]]),
        ],
        G::CH => vec![
            gate_op(G::S, &[q[1]]),
            gate_op(G::H, &[q[1]]),
            gate_op(G::T, &[q[1]]),
            gate_op(G::CX, q),
            gate_op(G::Tdg, &[q[1]]),
            gate_op(G::H, &[q[1]]),
            gate_op(G::Sdg, &[q[1]]),
        ],
        G::Swap => vec![
            gate_op(G::CX, &[q[0], q[1]]),
            gate_op(G::CX, &[q[1], q[0]]),
            gate_op(G::CX, &[q[0], q[1]]),
        ],
        G::ISwap => vec![
            gate_op(G::S, &[q[0]]),
            gate_op(G::S, &[q[1]]),
            gate_op(G::H, &[q[0]]),
            gate_op(G::CX, &[q[0], q[1]]),
            gate_op(G::CX, &[q[1], q[0]]),
            gate_op(G::H, &[q[1]]),
        ],
        G::CRz(theta) => vec![
            gate_op(G::Rz(theta / 2.0), &[q[1]]),
            gate_op(G::CX, q),
            gate_op(G::Rz(-theta / 2.0), &[q[1]]),
            gate_op(G::CX, q),
        ],
        G::CRy(theta) => vec![
            gate_op(G::Ry(theta / 2.0), &[q[1]]),
            gate_op(G::CX, q),
            gate_op(G::Ry(-theta / 2.0), &[q[1]]),
            gate_op(G::CX, q),
        ],
        G::CRx(theta) => vec![
            gate_op(G::H, &[q[1]]),
            gate_op(G::CRz(theta), q),
            gate_op(G::H, &[q[1]]),
        ],
        G::CP(theta) => vec![
            gate_op(G::P(theta / 2.0), &[q[0]]),
            gate_op(G::P(theta / 2.0), &[q[1]]),
            gate_op(G::CX, q),
            gate_op(G::P(-theta / 2.0), &[q[1]]),
            gate_op(G::CX, q),
        ],
        G::RZZ(theta) => vec![
            gate_op(G::CX, q),
            gate_op(G::Rz(theta), &[q[1]]),
            gate_op(G::CX, q),
        ],
        G::RXX(theta) => vec![
            gate_op(G::H, &[q[0]]),
            gate_op(G::H, &[q[1]]),
            gate_op(G::RZZ(theta), q),
            gate_op(G::H, &[q[0]]),
            gate_op(G::H, &[q[1]]),
        ],
        G::RYY(theta) => vec![
            gate_op(G::Rx(FRAC_PI_2), &[q[0]]),
            gate_op(G::Rx(FRAC_PI_2), &[q[1]]),
            gate_op(G::RZZ(theta), q),
            gate_op(G::Rx(-FRAC_PI_2), &[q[0]]),
            gate_op(G::Rx(-FRAC_PI_2), &[q[1]]),
        ],
        G::CCX => {
            let (a, b, t) = (q[0], q[1], q[2]);
            vec![
                gate_op(G::H, &[t]),
                gate_op(G::CX, &[b, t]),
                gate_op(G::Tdg, &[t]),
                gate_op(G::CX, &[a, t]),
                gate_op(G::T, &[t]),
                gate_op(G::CX, &[b, t]),
                gate_op(G::Tdg, &[t]),
                gate_op(G::CX, &[a, t]),
                gate_op(G::T, &[b]),
                gate_op(G::T, &[t]),
                gate_op(G::H, &[t]),
                gate_op(G::CX, &[a, b]),
                gate_op(G::T, &[a]),
                gate_op(G::Tdg, &[b]),
                gate_op(G::CX, &[a, b]),
            ]
        }
        G::CSwap => {
            let (c, a, b) = (q[0], q[1], q[2]);
            vec![
                gate_op(G::CX, &[b, a]),
                gate_op(G::CCX, &[c, a, b]),
                gate_op(G::CX, &[b, a]),
            ]
        }
    };
    Some(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(circuit: &Circuit) -> Vec<&str> {
        circuit.ops().iter().map(Operation::name).collect()
    }

    #[test]
    fn test_supported_circuit_untouched() {
        let mut circuit = Circuit::bell();
        let before = circuit.clone();
        let pass = BasisTranslation::new(GateSet::universal());
        assert!(!pass.should_run(&circuit));
        pass.run(&mut circuit).unwrap();
        assert_eq!(circuit, before);
    }

    #[test]
    fn test_h_translates_for_rigetti() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        circuit.h(0).unwrap();

        // Rigetti supports h directly; use a native-only set instead.
        let native = GateSet {
            single_qubit: vec!["rx".into(), "rz".into()],
            two_qubit: vec!["cz".into()],
            three_qubit: vec![],
            native: vec![],
        };
        BasisTranslation::new(native).run(&mut circuit).unwrap();
        assert_eq!(names(&circuit), vec!["rz", "rx", "rz"]);
    }

    #[test]
    fn test_cx_becomes_cz_conjugation() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.cx(0, 1).unwrap();

        let native = GateSet {
            single_qubit: vec!["rx".into(), "rz".into(), "h".into()],
            two_qubit: vec!["cz".into()],
            three_qubit: vec![],
            native: vec![],
        };
        BasisTranslation::new(native).run(&mut circuit).unwrap();
        assert_eq!(names(&circuit), vec!["h", "cz", "h"]);
        assert_eq!(circuit.ops()[1].qubits, vec![0, 1]);
    }

    #[test]
    fn test_toffoli_translates_for_ionq() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit.gate(StandardGate::CCX, [0, 1, 2]).unwrap();

        let pass = BasisTranslation::new(GateSet::ionq());
        pass.run(&mut circuit).unwrap();

        let set = GateSet::ionq();
        assert!(circuit.ops().iter().all(|op| set.contains(op.name())));
        assert!(circuit.ops().len() > 10);
    }

    #[test]
    fn test_untranslatable_gate_left_in_place() {
        use skinfaxi_ir::CustomGate;

        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.gate(CustomGate::new("mystery", 2), [0, 1]).unwrap();

        BasisTranslation::new(GateSet::ionq())
            .run(&mut circuit)
            .unwrap();
        assert_eq!(names(&circuit), vec!["mystery"]);
    }

    #[test]
    fn test_measure_and_barrier_pass_through() {
        let mut circuit = Circuit::with_size("t", 1, 1);
        circuit.barrier_all().unwrap();
        circuit.measure(0, 0).unwrap();

        BasisTranslation::new(GateSet::rigetti())
            .run(&mut circuit)
            .unwrap();
        assert_eq!(names(&circuit), vec!["barrier", "measure"]);
    }
}
