//! QASM emitter.
//!
//! Emits OpenQASM 2.0 — the primary exchange format for transpiled circuits.
//! Register structure is preserved, so a round trip through `parse` keeps
//! names and operand placement intact.

use skinfaxi_ir::{Circuit, Gate, OpKind, Operation, Register};

/// Emit a circuit as OpenQASM 2.0 source.
pub fn emit(circuit: &Circuit) -> String {
    let mut out = String::new();
    out.push_str("OPENQASM 2.0;\n");
    out.push_str("include \"qelib1.inc\";\n");

    for reg in circuit.qregs() {
        out.push_str(&format!("qreg {}[{}];\n", reg.name, reg.size));
    }
    for reg in circuit.cregs() {
        out.push_str(&format!("creg {}[{}];\n", reg.name, reg.size));
    }

    for op in circuit.ops() {
        emit_op(&mut out, circuit, op);
    }
    out
}

fn emit_op(out: &mut String, circuit: &Circuit, op: &Operation) {
    match &op.kind {
        OpKind::Gate(gate) => {
            let params = render_params(gate);
            let operands = op
                .qubits
                .iter()
                .map(|&q| wire_ref(circuit.qregs(), q))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("{}{} {};\n", gate.name(), params, operands));
        }
        OpKind::Measure => {
            for (&q, &c) in op.qubits.iter().zip(op.clbits.iter()) {
                out.push_str(&format!(
                    "measure {} -> {};\n",
                    wire_ref(circuit.qregs(), q),
                    wire_ref(circuit.cregs(), c)
                ));
            }
        }
        OpKind::Reset => {
            for &q in &op.qubits {
                out.push_str(&format!("reset {};\n", wire_ref(circuit.qregs(), q)));
            }
        }
        OpKind::Barrier => {
            let operands = op
                .qubits
                .iter()
                .map(|&q| wire_ref(circuit.qregs(), q))
                .collect::<Vec<_>>()
                .join(", ");
            if operands.is_empty() {
                out.push_str("barrier;\n");
            } else {
                out.push_str(&format!("barrier {};\n", operands));
            }
        }
    }
}

fn render_params(gate: &Gate) -> String {
    let params = gate.params();
    if params.is_empty() {
        String::new()
    } else {
        let rendered: Vec<String> = params.iter().map(|&p| render_angle(p)).collect();
        format!("({})", rendered.join(", "))
    }
}

/// Render an angle, preferring exact π fractions where they apply.
fn render_angle(value: f64) -> String {
    let pi = std::f64::consts::PI;
    let fractions: &[(f64, &str)] = &[
        (pi, "pi"),
        (-pi, "-pi"),
        (pi / 2.0, "pi/2"),
        (-pi / 2.0, "-pi/2"),
        (pi / 4.0, "pi/4"),
        (-pi / 4.0, "-pi/4"),
        (pi / 8.0, "pi/8"),
        (-pi / 8.0, "-pi/8"),
    ];
    for (v, s) in fractions {
        if (value - v).abs() < 1e-12 {
            return (*s).to_string();
        }
    }
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Resolve a flat wire index back to a `name[offset]` reference.
fn wire_ref(registers: &[Register], wire: u32) -> String {
    let mut start = 0;
    for reg in registers {
        if wire < start + reg.size {
            return format!("{}[{}]", reg.name, wire - start);
        }
        start += reg.size;
    }
    // Undeclared wires cannot appear in a validated circuit.
    format!("q[{wire}]")
}
