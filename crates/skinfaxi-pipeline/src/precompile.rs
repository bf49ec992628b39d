//! Best-effort precompilation.
//!
//! The fallback applied when canonicalization reports an untranslatable
//! construct: rewrite the raw program into a fixed, broadly-supported gate
//! vocabulary using its own representation's rules, then let the pipeline
//! re-attempt canonicalization. The rewrite is idempotent — operations
//! already in the core vocabulary pass through unchanged — so applying it to
//! an already-precompiled program is harmless.

use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use skinfaxi_ir::{Circuit, CustomGate, Gate, OpKind, Operation, StandardGate};

use crate::error::PipelineResult;
use crate::program::RawProgram;

/// Rewrite a raw program into the core gate vocabulary, best effort.
///
/// Alias gates (`cnot`, `u1`–`u3`, `toffoli`, ...) become their standard
/// counterparts; constructs with no known rewrite survive unchanged and will
/// fail canonicalization a second time, which ends the retry loop.
pub fn precompile(program: &RawProgram) -> PipelineResult<RawProgram> {
    let circuit = match program {
        RawProgram::Qasm(text) => skinfaxi_qasm::parse(text)?,
        RawProgram::Quil(text) => skinfaxi_quil::parse(text)?,
        RawProgram::Circuit(circuit) => circuit.clone(),
    };
    debug!(
        "Precompiling {} program ({} operations)",
        program.representation(),
        circuit.ops().len()
    );
    Ok(RawProgram::Circuit(rewrite_extended(circuit)?))
}

/// Resolve extended-vocabulary operations into the core vocabulary.
fn rewrite_extended(mut circuit: Circuit) -> PipelineResult<Circuit> {
    let mut out = Vec::with_capacity(circuit.ops().len());
    for op in circuit.ops() {
        match &op.kind {
            OpKind::Gate(Gate::Custom(custom)) => match resolve_alias(custom, &op.qubits) {
                Some(resolved) => out.extend(resolved),
                None => out.push(op.clone()),
            },
            _ => out.push(op.clone()),
        }
    }
    circuit.set_ops(out)?;
    Ok(circuit)
}

fn gate_op(gate: StandardGate, qubits: &[u32]) -> Operation {
    Operation::gate(gate, qubits.iter().copied())
}

/// The alias table: one entry per name the broadly-supported vocabulary
/// knows under a different spelling or as a short decomposition.
///
/// Operand counts are re-checked here; a malformed call (e.g. `cnot` on one
/// qubit) is not an alias and survives for canonicalization to reject.
fn resolve_alias(custom: &CustomGate, q: &[u32]) -> Option<Vec<Operation>> {
    use StandardGate as G;

    let params = custom.params.as_slice();
    let ops = match (custom.name.to_lowercase().as_str(), params) {
        ("cnot", []) if q.len() == 2 => vec![gate_op(G::CX, q)],
        ("ccnot" | "toffoli", []) if q.len() == 3 => vec![gate_op(G::CCX, q)],
        ("fredkin", []) if q.len() == 3 => vec![gate_op(G::CSwap, q)],
        ("i" | "u0", _) if q.len() == 1 => vec![gate_op(G::I, q)],
        ("v" | "sqx", []) if q.len() == 1 => vec![gate_op(G::SX, q)],
        ("vdg", []) if q.len() == 1 => vec![gate_op(G::SXdg, q)],
        ("phase", &[theta]) if q.len() == 1 => vec![gate_op(G::P(theta), q)],
        ("u1", &[lambda]) if q.len() == 1 => vec![gate_op(G::P(lambda), q)],
        ("u2", &[phi, lambda]) if q.len() == 1 => {
            vec![gate_op(G::U(FRAC_PI_2, phi, lambda), q)]
        }
        ("u3", &[theta, phi, lambda]) if q.len() == 1 => {
            vec![gate_op(G::U(theta, phi, lambda), q)]
        }
        ("cu1" | "cphase", &[theta]) if q.len() == 2 => vec![gate_op(G::CP(theta), q)],
        ("cu3", &[theta, phi, lambda]) if q.len() == 2 => {
            let (c, t) = (q[0], q[1]);
            vec![
                gate_op(G::P((lambda + phi) / 2.0), &[c]),
                gate_op(G::P((lambda - phi) / 2.0), &[t]),
                gate_op(G::CX, &[c, t]),
                gate_op(G::U(-theta / 2.0, 0.0, -(phi + lambda) / 2.0), &[t]),
                gate_op(G::CX, &[c, t]),
                gate_op(G::U(theta / 2.0, phi, 0.0), &[t]),
            ]
        }
        _ => return None,
    };
    Some(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{CanonicalOutcome, to_canonical};

    #[test]
    fn test_cnot_alias_resolves() {
        let program = RawProgram::Qasm("OPENQASM 2.0; qreg q[2]; cnot q[0], q[1];".into());
        let precompiled = precompile(&program).unwrap();

        let CanonicalOutcome::Canonical(circuit) = to_canonical(&precompiled).unwrap() else {
            panic!("expected canonical circuit after precompilation");
        };
        assert_eq!(circuit.ops()[0].name(), "cx");
    }

    #[test]
    fn test_u3_resolves_to_u() {
        let program =
            RawProgram::Qasm("OPENQASM 2.0; qreg q[1]; u3(0.1, 0.2, 0.3) q[0];".into());
        let RawProgram::Circuit(circuit) = precompile(&program).unwrap() else {
            panic!("expected circuit program");
        };
        assert!(matches!(
            circuit.ops()[0].as_gate(),
            Some(Gate::Standard(StandardGate::U(_, _, _)))
        ));
    }

    #[test]
    fn test_cu3_decomposes_into_core_vocabulary() {
        let program =
            RawProgram::Qasm("OPENQASM 2.0; qreg q[2]; cu3(0.1, 0.2, 0.3) q[0], q[1];".into());
        let precompiled = precompile(&program).unwrap();
        assert!(matches!(
            to_canonical(&precompiled).unwrap(),
            CanonicalOutcome::Canonical(_)
        ));
    }

    #[test]
    fn test_unknown_gate_survives() {
        let program = RawProgram::Qasm("OPENQASM 2.0; qreg q[2]; mystery q[0], q[1];".into());
        let precompiled = precompile(&program).unwrap();
        let CanonicalOutcome::Unsupported { construct } = to_canonical(&precompiled).unwrap()
        else {
            panic!("expected unsupported outcome");
        };
        assert_eq!(construct, "mystery");
    }

    #[test]
    fn test_idempotent_on_core_vocabulary() {
        let circuit = Circuit::bell();
        let once = precompile(&RawProgram::Circuit(circuit)).unwrap();
        let twice = precompile(&once).unwrap();
        assert_eq!(once, twice);
    }
}
