//! Default qubit layout.
//!
//! Compacts qubit indices to `0..n` in first-use order and re-declares a
//! single quantum register of exactly that width. This is the repair pass
//! for circuits whose device placement was lost in a lossy exchange-format
//! round trip: Quil keeps physical qubit indices (`RX(pi) 17`), so a
//! re-parsed program can look far wider than the circuit actually is.

use rustc_hash::FxHashMap;
use tracing::debug;

use skinfaxi_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::Pass;

/// Maps touched qubits onto `0..n` in first-use order.
pub struct DefaultLayout;

impl Pass for DefaultLayout {
    fn name(&self) -> &str {
        "default-layout"
    }

    fn run(&self, circuit: &mut Circuit) -> CompileResult<()> {
        let mut mapping: FxHashMap<u32, u32> = FxHashMap::default();
        for op in circuit.ops() {
            for &q in &op.qubits {
                let next = mapping.len() as u32;
                mapping.entry(q).or_insert(next);
            }
        }

        let width = mapping.len() as u32;
        debug!(
            "Compacting {} declared qubits onto {}",
            circuit.num_qubits(),
            width
        );

        let mut rebuilt = Circuit::new(circuit.name().to_string());
        if width > 0 {
            rebuilt.add_qreg("q", width);
        }
        for reg in circuit.cregs() {
            rebuilt.add_creg(reg.name.clone(), reg.size);
        }
        for op in circuit.ops() {
            let mut mapped = op.clone();
            mapped.qubits = op.qubits.iter().map(|q| mapping[q]).collect();
            rebuilt.push(mapped)?;
        }

        *circuit = rebuilt;
        Ok(())
    }
}
