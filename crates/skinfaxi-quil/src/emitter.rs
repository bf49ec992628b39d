//! Quil emitter.
//!
//! Flattens the canonical circuit into Quil: qubits become bare indices and
//! every classical bit lands in a single `ro` region. Barriers have no Quil
//! equivalent and are dropped — this is the lossy half of the round trip the
//! default-layout repair pass compensates for.

use std::f64::consts::PI;

use skinfaxi_ir::{Circuit, Gate, OpKind, Operation, StandardGate};

/// Emit a circuit as Quil source.
pub fn emit(circuit: &Circuit) -> String {
    let mut out = String::new();
    if circuit.num_clbits() > 0 {
        out.push_str(&format!("DECLARE ro BIT[{}]\n", circuit.num_clbits()));
    }
    for op in circuit.ops() {
        emit_op(&mut out, op);
    }
    out
}

fn emit_op(out: &mut String, op: &Operation) {
    match &op.kind {
        OpKind::Gate(gate) => emit_gate(out, gate, &op.qubits),
        OpKind::Measure => {
            for (&q, &c) in op.qubits.iter().zip(op.clbits.iter()) {
                out.push_str(&format!("MEASURE {q} ro[{c}]\n"));
            }
        }
        OpKind::Reset => {
            for &q in &op.qubits {
                out.push_str(&format!("RESET {q}\n"));
            }
        }
        // No Quil equivalent; dropped by design.
        OpKind::Barrier => {}
    }
}

fn emit_gate(out: &mut String, gate: &Gate, qubits: &[u32]) {
    if let Gate::Standard(std) = gate {
        match std {
            StandardGate::Sdg => return emit_line(out, "RZ", &[-PI / 2.0], qubits),
            StandardGate::Tdg => return emit_line(out, "RZ", &[-PI / 4.0], qubits),
            StandardGate::SX => return emit_line(out, "RX", &[PI / 2.0], qubits),
            StandardGate::SXdg => return emit_line(out, "RX", &[-PI / 2.0], qubits),
            // U(θ, φ, λ) = RZ(φ) · RY(θ) · RZ(λ), applied right to left.
            StandardGate::U(theta, phi, lambda) => {
                emit_line(out, "RZ", &[*lambda], qubits);
                emit_line(out, "RY", &[*theta], qubits);
                emit_line(out, "RZ", &[*phi], qubits);
                return;
            }
            _ => {}
        }
    }

    let name = match gate.name() {
        "id" => "I".to_string(),
        "p" => "PHASE".to_string(),
        "cx" => "CNOT".to_string(),
        "ccx" => "CCNOT".to_string(),
        "cp" => "CPHASE".to_string(),
        other => other.to_uppercase(),
    };
    emit_line(out, &name, &gate.params(), qubits);
}

fn emit_line(out: &mut String, name: &str, params: &[f64], qubits: &[u32]) {
    let rendered_params = if params.is_empty() {
        String::new()
    } else {
        let parts: Vec<String> = params.iter().map(|&p| render_angle(p)).collect();
        format!("({})", parts.join(", "))
    };
    let operands: Vec<String> = qubits.iter().map(u32::to_string).collect();
    out.push_str(&format!("{name}{rendered_params} {}\n", operands.join(" ")));
}

fn render_angle(value: f64) -> String {
    let fractions: &[(f64, &str)] = &[
        (PI, "pi"),
        (-PI, "-pi"),
        (PI / 2.0, "pi/2"),
        (-PI / 2.0, "-pi/2"),
        (PI / 4.0, "pi/4"),
        (-PI / 4.0, "-pi/4"),
    ];
    for (v, s) in fractions {
        if (value - v).abs() < 1e-12 {
            return (*s).to_string();
        }
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_emit_bell() {
        let quil = emit(&Circuit::bell());
        assert!(quil.contains("DECLARE ro BIT[2]"));
        assert!(quil.contains("H 0"));
        assert!(quil.contains("CNOT 0 1"));
        assert!(quil.contains("MEASURE 0 ro[0]"));
    }

    #[test]
    fn test_emit_translated_gates() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        circuit.gate(StandardGate::Sdg, [0]).unwrap();
        circuit.gate(StandardGate::SX, [0]).unwrap();
        circuit.gate(StandardGate::P(0.5), [0]).unwrap();

        let quil = emit(&circuit);
        assert!(quil.contains("RZ(-pi/2) 0"));
        assert!(quil.contains("RX(pi/2) 0"));
        assert!(quil.contains("PHASE(0.5) 0"));
    }

    #[test]
    fn test_round_trip_is_lossy_for_registers() {
        let mut circuit = Circuit::new("named");
        circuit.add_qreg("data", 2);
        circuit.add_creg("out", 2);
        circuit.h(0).unwrap();
        circuit.barrier_all().unwrap();
        circuit.cx(0, 1).unwrap();
        circuit.measure(1, 0).unwrap();

        let reparsed = parse(&emit(&circuit)).unwrap();
        // Structure survives...
        assert_eq!(reparsed.num_qubits(), 2);
        assert_eq!(reparsed.num_clbits(), 2);
        // ...but names and barriers do not.
        assert_eq!(reparsed.qregs()[0].name, "q");
        assert_eq!(reparsed.cregs()[0].name, "ro");
        assert!(!reparsed.ops().iter().any(|op| op.is_barrier()));
    }

    #[test]
    fn test_round_trip_core_gates() {
        let quil = "H 0\nCNOT 0 1\nRZ(pi/4) 1\nSWAP 0 1\n";
        let circuit = parse(quil).unwrap();
        let again = parse(&emit(&circuit)).unwrap();
        assert_eq!(circuit.ops(), again.ops());
    }
}
