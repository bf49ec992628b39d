//! IonQ target and provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use skinfaxi_hal::{
    CompileOutcome, Counts, Credentials, GateSet, HalError, HalResult, Target, TargetProfile,
    TargetProvider, Topology,
};
use skinfaxi_ir::{Circuit, Gate, OpKind, Operation, StandardGate};
use skinfaxi_types::ExchangeFormat;

use crate::api::{IonqClient, IonqOp, JobRequest};
use crate::error::{IonqError, IonqResult};

/// Provider name the IonQ adapter registers under.
pub const PROVIDER_NAME: &str = "ionq";

/// Interval between result polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll attempts before giving up (bounded well below the queue budget).
const MAX_POLLS: u32 = 450;

/// IonQ shot ceiling per job.
const IONQ_MAX_SHOTS: u32 = 10_000;

/// An IonQ cloud device.
pub struct IonqTarget {
    client: Arc<IonqClient>,
    /// API target name (`simulator`, `qpu.harmony`, ...).
    api_target: String,
    profile: TargetProfile,
}

impl IonqTarget {
    fn new(client: Arc<IonqClient>, api_target: String, device: String, num_qubits: u32) -> Self {
        let is_simulator = api_target == "simulator";
        Self {
            client,
            api_target,
            profile: TargetProfile {
                provider: PROVIDER_NAME.to_string(),
                device,
                num_qubits,
                gate_set: GateSet::ionq(),
                // Trapped-ion devices are fully connected.
                topology: Topology::any_to_any(),
                max_shots: IONQ_MAX_SHOTS,
                is_simulator,
                exchange_format: ExchangeFormat::Qasm,
            },
        }
    }

    /// Serialize a circuit to the IonQ JSON operation list.
    ///
    /// Measurements are implicit (every qubit is read out at the end) and
    /// barriers carry no meaning for the API, so both are skipped.
    fn serialize_circuit(circuit: &Circuit) -> IonqResult<Vec<IonqOp>> {
        let mut ops = Vec::with_capacity(circuit.ops().len());
        for op in circuit.ops() {
            match &op.kind {
                OpKind::Gate(Gate::Standard(gate)) => ops.push(Self::gate_to_op(gate, op)?),
                OpKind::Gate(Gate::Custom(custom)) => {
                    return Err(IonqError::UnsupportedGate(custom.name.clone()));
                }
                OpKind::Measure | OpKind::Barrier => {}
                OpKind::Reset => {
                    return Err(IonqError::UnsupportedGate("reset".to_string()));
                }
            }
        }
        Ok(ops)
    }

    fn gate_to_op(gate: &StandardGate, op: &Operation) -> IonqResult<IonqOp> {
        use StandardGate as G;

        let q = &op.qubits;
        let ionq_op = match *gate {
            G::X => IonqOp::on_target("x", q[0]),
            G::Y => IonqOp::on_target("y", q[0]),
            G::Z => IonqOp::on_target("z", q[0]),
            G::H => IonqOp::on_target("h", q[0]),
            G::S => IonqOp::on_target("s", q[0]),
            G::Sdg => IonqOp::on_target("si", q[0]),
            G::T => IonqOp::on_target("t", q[0]),
            G::Tdg => IonqOp::on_target("ti", q[0]),
            G::SX => IonqOp::on_target("v", q[0]),
            G::SXdg => IonqOp::on_target("vi", q[0]),
            G::Rx(theta) => IonqOp::on_target("rx", q[0]).with_rotation(theta),
            G::Ry(theta) => IonqOp::on_target("ry", q[0]).with_rotation(theta),
            G::Rz(theta) => IonqOp::on_target("rz", q[0]).with_rotation(theta),
            G::CX => IonqOp::on_target("cnot", q[1]).with_control(q[0]),
            G::Swap => IonqOp::on_targets("swap", vec![q[0], q[1]]),
            G::RXX(theta) => {
                IonqOp::on_targets("xx", vec![q[0], q[1]]).with_rotation(theta)
            }
            G::RYY(theta) => {
                IonqOp::on_targets("yy", vec![q[0], q[1]]).with_rotation(theta)
            }
            G::RZZ(theta) => {
                IonqOp::on_targets("zz", vec![q[0], q[1]]).with_rotation(theta)
            }
            ref other => return Err(IonqError::UnsupportedGate(other.name().to_string())),
        };
        Ok(ionq_op)
    }

    /// Convert the decimal-keyed probability histogram into counts.
    fn probabilities_to_counts(
        probabilities: &std::collections::HashMap<String, f64>,
        num_qubits: u32,
        shots: u32,
    ) -> Counts {
        let mut counts = Counts::new();
        for (key, &probability) in probabilities {
            let Ok(outcome) = key.parse::<u64>() else {
                continue;
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let count = (probability * f64::from(shots)).round() as u64;
            if count == 0 {
                continue;
            }
            let bits: String = (0..num_qubits)
                .rev()
                .map(|q| if (outcome >> q) & 1 == 1 { '1' } else { '0' })
                .collect();
            counts.insert(bits, count);
        }
        counts
    }

    async fn await_completion(&self, job_id: &str) -> IonqResult<()> {
        for _ in 0..MAX_POLLS {
            let job = self.client.get_job(job_id).await?;
            if job.is_completed() {
                return Ok(());
            }
            if job.is_failed() {
                let reason = job
                    .failure
                    .and_then(|f| f.error)
                    .unwrap_or_else(|| job.status.clone());
                return Err(IonqError::JobFailed(reason));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Err(IonqError::Timeout(job_id.to_string()))
    }
}

#[async_trait]
impl Target for IonqTarget {
    fn profile(&self) -> &TargetProfile {
        &self.profile
    }

    fn compile(&self, circuit: &Circuit) -> CompileOutcome {
        skinfaxi_compile::compile_for(&self.profile, circuit)
    }

    #[instrument(skip(self, circuit), fields(target = %self.api_target))]
    async fn execute(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts> {
        if shots == 0 || shots > self.profile.max_shots {
            return Err(HalError::InvalidShots(format!(
                "Shot count must be between 1 and {}",
                self.profile.max_shots
            )));
        }

        let ops = Self::serialize_circuit(circuit).map_err(HalError::from)?;
        let request = JobRequest::new(&self.api_target, shots, circuit.num_qubits(), ops);

        let created = self.client.submit_job(&request).await.map_err(HalError::from)?;
        info!("IonQ job submitted: {}", created.id);

        self.await_completion(&created.id).await.map_err(HalError::from)?;

        let probabilities = self
            .client
            .get_results(&created.id)
            .await
            .map_err(HalError::from)?;
        Ok(Self::probabilities_to_counts(
            &probabilities,
            circuit.num_qubits(),
            shots,
        ))
    }
}

/// Provider resolving IonQ cloud devices.
///
/// Requires a `token` parameter; device names are matched against the live
/// backend catalog, with spaces normalized to dashes (`"Aria 1"` finds
/// `qpu.aria-1`).
pub struct IonqProvider;

impl IonqProvider {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }
}

impl Default for IonqProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetProvider for IonqProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn credentials(&self, params: &skinfaxi_types::TypedParams) -> HalResult<Credentials> {
        Credentials::token_from_params(PROVIDER_NAME, params)
    }

    async fn resolve(
        &self,
        device: &str,
        credentials: &Credentials,
    ) -> HalResult<Arc<dyn Target>> {
        let Some(token) = credentials.bearer_token() else {
            return Err(HalError::MissingCredential {
                provider: PROVIDER_NAME.to_string(),
                field: "token".to_string(),
            });
        };
        let client = IonqClient::new(token).map_err(HalError::from)?;

        let wanted = device.replace(' ', "-").to_lowercase();
        let backends = client.list_backends().await.map_err(HalError::from)?;
        let matched = backends
            .into_iter()
            .find(|b| b.backend.to_lowercase().contains(&wanted));

        match matched {
            Some(backend) => {
                debug!("Resolved IonQ device {} -> {}", device, backend.backend);
                Ok(Arc::new(IonqTarget::new(
                    Arc::new(client),
                    backend.backend.clone(),
                    backend.backend,
                    backend.qubits,
                )))
            }
            None => Err(HalError::TargetNotFound {
                provider: PROVIDER_NAME.to_string(),
                device: device.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::f64::consts::PI;

    #[test]
    fn test_serialize_bell_circuit() {
        let ops = IonqTarget::serialize_circuit(&Circuit::bell()).unwrap();
        // Measurements are implicit; only the two gates remain.
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].gate, "h");
        assert_eq!(ops[1].gate, "cnot");
        assert_eq!(ops[1].control, Some(0));
        assert_eq!(ops[1].target, Some(1));
    }

    #[test]
    fn test_serialize_rotation() {
        let mut circuit = Circuit::with_size("r", 1, 0);
        circuit.rx(PI / 2.0, 0).unwrap();
        let ops = IonqTarget::serialize_circuit(&circuit).unwrap();
        assert_eq!(ops[0].gate, "rx");
        assert!((ops[0].rotation.unwrap() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_serialize_rejects_custom_gate() {
        use skinfaxi_ir::CustomGate;
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.gate(CustomGate::new("mystery", 2), [0, 1]).unwrap();
        assert!(matches!(
            IonqTarget::serialize_circuit(&circuit),
            Err(IonqError::UnsupportedGate(name)) if name == "mystery"
        ));
    }

    #[test]
    fn test_probabilities_to_counts() {
        let mut probabilities = HashMap::new();
        probabilities.insert("0".to_string(), 0.5);
        probabilities.insert("3".to_string(), 0.5);

        let counts = IonqTarget::probabilities_to_counts(&probabilities, 2, 1000);
        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("11"), 500);
        assert_eq!(counts.get("01"), 0);
    }

    #[test]
    fn test_probabilities_skip_garbage_keys() {
        let mut probabilities = HashMap::new();
        probabilities.insert("not-a-number".to_string(), 1.0);
        let counts = IonqTarget::probabilities_to_counts(&probabilities, 2, 100);
        assert!(counts.is_empty());
    }
}
