//! Simulator target and provider.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument};

use skinfaxi_hal::{
    CompileOutcome, Counts, Credentials, GateSet, HalError, HalResult, Target, TargetProfile,
    TargetProvider, Topology,
};
use skinfaxi_ir::Circuit;
use skinfaxi_types::ExchangeFormat;

use crate::statevector::Statevector;

/// Provider name the simulator registers under.
pub const PROVIDER_NAME: &str = "sim";

/// Device name of the bundled statevector simulator.
pub const DEVICE_NAME: &str = "statevector_simulator";

/// Default qubit limit; memory-bound at roughly 20 qubits.
const DEFAULT_MAX_QUBITS: u32 = 20;

const MAX_SHOTS: u32 = 100_000;

/// Local statevector simulator target.
///
/// Supports the full canonical gate vocabulary with any-to-any
/// connectivity, so compilation is a width check and nothing more.
pub struct SimTarget {
    profile: TargetProfile,
}

impl SimTarget {
    /// Create a simulator with the default qubit limit.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator with a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            profile: TargetProfile {
                provider: PROVIDER_NAME.to_string(),
                device: DEVICE_NAME.to_string(),
                num_qubits: max_qubits,
                gate_set: GateSet::universal(),
                topology: Topology::any_to_any(),
                max_shots: MAX_SHOTS,
                is_simulator: true,
                exchange_format: ExchangeFormat::Qasm,
            },
        }
    }

    /// Evolve the state once and sample `shots` outcomes.
    ///
    /// The evolution is deterministic (no mid-circuit collapse beyond
    /// reset), so sampling the final distribution per shot is equivalent to
    /// re-running the circuit.
    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> Counts {
        let start = Instant::now();
        debug!(
            "Simulating {} qubits, {} operations, {} shots",
            circuit.num_qubits(),
            circuit.ops().len(),
            shots
        );

        let mut sv = Statevector::new(circuit.num_qubits());
        for op in circuit.ops() {
            sv.apply(op);
        }

        // Measurement mapping: qubit → classical bit, in program order.
        let measures: Vec<(u32, u32)> = circuit
            .ops()
            .iter()
            .filter(|op| op.is_measure())
            .map(|op| (op.qubits[0], op.clbits[0]))
            .collect();
        let num_clbits = circuit.num_clbits() as usize;

        let width = circuit.num_qubits() as usize;
        let mut counts = Counts::new();
        for _ in 0..shots {
            let outcome = sv.sample();
            counts.insert(bitstring(outcome, &measures, num_clbits, width), 1);
        }

        debug!("Simulation completed in {:?}", start.elapsed());
        counts
    }
}

/// Render an outcome as a bitstring, rightmost bit = lowest index.
///
/// With measurements declared, the string ranges over classical bits;
/// a circuit without classical bits reads out every qubit directly.
fn bitstring(outcome: usize, measures: &[(u32, u32)], num_clbits: usize, width: usize) -> String {
    if num_clbits == 0 {
        return (0..width)
            .rev()
            .map(|q| char::from(b'0' + Statevector::outcome_bit(outcome, q)))
            .collect();
    }
    let mut bits = vec![b'0'; num_clbits];
    for &(qubit, clbit) in measures {
        bits[clbit as usize] = b'0' + Statevector::outcome_bit(outcome, qubit as usize);
    }
    bits.iter().rev().map(|&b| char::from(b)).collect()
}

impl Default for SimTarget {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Target for SimTarget {
    fn profile(&self) -> &TargetProfile {
        &self.profile
    }

    fn compile(&self, circuit: &Circuit) -> CompileOutcome {
        let required = circuit.num_qubits();
        if required > self.profile.num_qubits {
            return CompileOutcome::TooManyQubits {
                required,
                limit: self.profile.num_qubits,
            };
        }
        // The universal gate set needs no translation.
        CompileOutcome::Compiled(circuit.clone())
    }

    #[instrument(skip(self, circuit))]
    async fn execute(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts> {
        if shots == 0 {
            return Err(HalError::InvalidShots("Shot count must be at least 1".into()));
        }
        if shots > self.profile.max_shots {
            return Err(HalError::InvalidShots(format!(
                "Requested {shots} shots but the simulator maximum is {}",
                self.profile.max_shots
            )));
        }
        if circuit.num_qubits() > self.profile.num_qubits {
            return Err(HalError::InvalidCircuit(format!(
                "Circuit has {} qubits but the simulator supports {}",
                circuit.num_qubits(),
                self.profile.num_qubits
            )));
        }
        Ok(self.run_simulation(circuit, shots))
    }
}

/// Provider resolving the bundled simulator device.
pub struct SimProvider {
    max_qubits: u32,
}

impl SimProvider {
    /// Create a provider with the default qubit limit.
    pub fn new() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }

    /// Create a provider whose simulators carry a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self { max_qubits }
    }
}

impl Default for SimProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetProvider for SimProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn resolve(
        &self,
        device: &str,
        _credentials: &Credentials,
    ) -> HalResult<Arc<dyn Target>> {
        match device.to_lowercase().as_str() {
            DEVICE_NAME | "statevector" => {
                Ok(Arc::new(SimTarget::with_max_qubits(self.max_qubits)))
            }
            _ => Err(HalError::TargetNotFound {
                provider: PROVIDER_NAME.to_string(),
                device: device.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bell_only_correlated_outcomes() {
        let target = SimTarget::new();
        let counts = target.execute(&Circuit::bell(), 1000).await.unwrap();

        assert_eq!(counts.total_shots(), 1000);
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_ghz_outcomes() {
        let target = SimTarget::new();
        let counts = target.execute(&Circuit::ghz(3), 500).await.unwrap();
        assert_eq!(counts.get("000") + counts.get("111"), 500);
    }

    #[tokio::test]
    async fn test_deterministic_x_circuit() {
        let mut circuit = Circuit::with_size("x", 2, 2);
        circuit.x(0).unwrap();
        circuit.measure(0, 0).unwrap();
        circuit.measure(1, 1).unwrap();

        let target = SimTarget::new();
        let counts = target.execute(&circuit, 100).await.unwrap();
        // Qubit 0 measured 1, qubit 1 measured 0; rightmost bit is clbit 0.
        assert_eq!(counts.get("01"), 100);
    }

    #[tokio::test]
    async fn test_invalid_shots() {
        let target = SimTarget::new();
        let err = target.execute(&Circuit::bell(), 0).await.unwrap_err();
        assert!(matches!(err, HalError::InvalidShots(_)));
    }

    #[test]
    fn test_compile_rejects_wide_circuit() {
        let target = SimTarget::with_max_qubits(5);
        assert!(matches!(
            target.compile(&Circuit::ghz(20)),
            CompileOutcome::TooManyQubits {
                required: 20,
                limit: 5
            }
        ));
    }

    #[tokio::test]
    async fn test_provider_resolution() {
        let provider = SimProvider::new();
        let target = provider
            .resolve("statevector_simulator", &Credentials::None)
            .await
            .unwrap();
        assert!(target.profile().is_simulator);

        let err = provider
            .resolve("ibmq_tokyo", &Credentials::None)
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::TargetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_unmeasured_circuit_reads_qubits() {
        let mut circuit = Circuit::with_size("plain", 1, 0);
        circuit.x(0).unwrap();

        let target = SimTarget::new();
        let counts = target.execute(&circuit, 10).await.unwrap();
        assert_eq!(counts.get("1"), 10);
    }
}
