//! Canonicalization.
//!
//! Turns a raw program into the canonical circuit, or reports the first
//! construct it cannot translate. The distinction matters: a parse failure
//! is fatal, but an untranslatable construct is retryable once via the
//! precompiler, so the two leave this module on different paths.

use skinfaxi_ir::Circuit;

use crate::error::PipelineResult;
use crate::program::RawProgram;

/// Outcome of canonicalizing a raw program.
#[derive(Debug, Clone)]
pub enum CanonicalOutcome {
    /// The program maps onto the core vocabulary.
    Canonical(Circuit),
    /// The program parses but uses a construct outside the core vocabulary.
    Unsupported {
        /// Name of the offending construct.
        construct: String,
    },
}

/// Convert a raw program into the canonical circuit representation.
///
/// Parse errors propagate as pipeline errors; a well-formed program whose
/// gates fall outside the core vocabulary yields
/// [`CanonicalOutcome::Unsupported`] with the first offending name.
pub fn to_canonical(program: &RawProgram) -> PipelineResult<CanonicalOutcome> {
    let circuit = match program {
        RawProgram::Qasm(text) => skinfaxi_qasm::parse(text)?,
        RawProgram::Quil(text) => skinfaxi_quil::parse(text)?,
        RawProgram::Circuit(circuit) => {
            circuit.validate()?;
            circuit.clone()
        }
    };

    match first_custom_construct(&circuit) {
        Some(construct) => Ok(CanonicalOutcome::Unsupported { construct }),
        None => Ok(CanonicalOutcome::Canonical(circuit)),
    }
}

/// First gate in the circuit outside the core vocabulary, if any.
fn first_custom_construct(circuit: &Circuit) -> Option<String> {
    circuit
        .ops()
        .iter()
        .filter_map(|op| op.as_gate())
        .find(|gate| gate.is_custom())
        .map(|gate| gate.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfaxi_ir::CustomGate;

    #[test]
    fn test_qasm_canonicalizes() {
        let program = RawProgram::Qasm(
            "OPENQASM 2.0; qreg q[2]; creg c[2]; h q[0]; cx q[0], q[1]; measure q -> c;".into(),
        );
        let CanonicalOutcome::Canonical(circuit) = to_canonical(&program).unwrap() else {
            panic!("expected canonical circuit");
        };
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.ops().len(), 4);
    }

    #[test]
    fn test_quil_canonicalizes() {
        let program = RawProgram::Quil("DECLARE ro BIT[1]\nH 0\nMEASURE 0 ro[0]\n".into());
        assert!(matches!(
            to_canonical(&program).unwrap(),
            CanonicalOutcome::Canonical(_)
        ));
    }

    #[test]
    fn test_alias_reports_unsupported() {
        let program = RawProgram::Qasm("OPENQASM 2.0; qreg q[2]; cnot q[0], q[1];".into());
        let CanonicalOutcome::Unsupported { construct } = to_canonical(&program).unwrap() else {
            panic!("expected unsupported outcome");
        };
        assert_eq!(construct, "cnot");
    }

    #[test]
    fn test_circuit_with_custom_gate_reports_unsupported() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.gate(CustomGate::new("entangle", 2), [0, 1]).unwrap();

        let CanonicalOutcome::Unsupported { construct } =
            to_canonical(&RawProgram::Circuit(circuit)).unwrap()
        else {
            panic!("expected unsupported outcome");
        };
        assert_eq!(construct, "entangle");
    }

    #[test]
    fn test_parse_error_is_fatal() {
        let program = RawProgram::Qasm("OPENQASM 2.0; qreg q[".into());
        assert!(to_canonical(&program).is_err());
    }
}
