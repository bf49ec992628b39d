//! Braket target and provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use skinfaxi_hal::{
    CompileOutcome, Counts, Credentials, HalError, HalResult, Target, TargetProfile,
    TargetProvider, Topology,
};
use skinfaxi_ir::{Circuit, Gate, OpKind, Operation};
use skinfaxi_types::TypedParams;

use crate::api::{BraketClient, TaskStatus};
use crate::device::{BraketDevice, lookup};
use crate::error::{BraketError, BraketResult};

/// Provider name the Braket adapter registers under.
pub const PROVIDER_NAME: &str = "aws";

/// Region used when the request does not carry one.
const DEFAULT_REGION: &str = "eu-west-2";

/// Interval between task polls.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll attempts before giving up.
const MAX_POLLS: u32 = 360;

/// Braket shot ceiling per task.
const BRAKET_MAX_SHOTS: u32 = 100_000;

/// A device reached through the Braket service.
pub struct BraketTarget {
    client: Arc<BraketClient>,
    device_arn: String,
    profile: TargetProfile,
}

impl BraketTarget {
    fn new(client: Arc<BraketClient>, device: &BraketDevice) -> Self {
        Self {
            client,
            device_arn: device.arn(),
            profile: TargetProfile {
                provider: PROVIDER_NAME.to_string(),
                device: device.name.clone(),
                num_qubits: device.num_qubits,
                gate_set: device.gate_set(),
                // Placement is delegated to the Braket compiler; circuits
                // arrive with logical indices.
                topology: Topology::any_to_any(),
                max_shots: BRAKET_MAX_SHOTS,
                is_simulator: device.is_simulator,
                exchange_format: device.exchange_format(),
            },
        }
    }

    /// The task's device ARN.
    pub fn device_arn(&self) -> &str {
        &self.device_arn
    }

    /// Serialize a circuit as the OpenQASM 3 program Braket executes.
    ///
    /// Registers are flattened to one `qubit[n]`/`bit[m]` pair; barriers
    /// carry no meaning on the wire and are dropped.
    fn to_openqasm3(circuit: &Circuit) -> BraketResult<String> {
        let mut out = String::from("OPENQASM 3.0;\n");
        out.push_str(&format!("qubit[{}] q;\n", circuit.num_qubits()));
        if circuit.num_clbits() > 0 {
            out.push_str(&format!("bit[{}] c;\n", circuit.num_clbits()));
        }

        for op in circuit.ops() {
            Self::emit_op(&mut out, op)?;
        }
        Ok(out)
    }

    fn emit_op(out: &mut String, op: &Operation) -> BraketResult<()> {
        match &op.kind {
            OpKind::Gate(Gate::Standard(gate)) => {
                let params = gate.params();
                let rendered_params = if params.is_empty() {
                    String::new()
                } else {
                    let list: Vec<String> = params.iter().map(ToString::to_string).collect();
                    format!("({})", list.join(", "))
                };
                let operands: Vec<String> =
                    op.qubits.iter().map(|q| format!("q[{q}]")).collect();
                out.push_str(&format!(
                    "{}{} {};\n",
                    gate.name(),
                    rendered_params,
                    operands.join(", ")
                ));
            }
            OpKind::Gate(Gate::Custom(custom)) => {
                return Err(BraketError::UnsupportedGate(custom.name.clone()));
            }
            OpKind::Measure => {
                for (&q, &c) in op.qubits.iter().zip(op.clbits.iter()) {
                    out.push_str(&format!("c[{c}] = measure q[{q}];\n"));
                }
            }
            OpKind::Reset => {
                for &q in &op.qubits {
                    out.push_str(&format!("reset q[{q}];\n"));
                }
            }
            OpKind::Barrier => {}
        }
        Ok(())
    }

    async fn await_completion(&self, task_arn: &str) -> BraketResult<crate::api::TaskInfo> {
        for _ in 0..MAX_POLLS {
            let task = self.client.get_task(task_arn).await?;
            match task.status {
                TaskStatus::Completed => return Ok(task),
                TaskStatus::Failed => {
                    return Err(BraketError::TaskFailed(
                        task.failure_reason
                            .unwrap_or_else(|| "no failure reason reported".to_string()),
                    ));
                }
                TaskStatus::Cancelled => {
                    return Err(BraketError::TaskCancelled(task_arn.to_string()));
                }
                TaskStatus::Pending => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
        Err(BraketError::Timeout(task_arn.to_string()))
    }
}

#[async_trait]
impl Target for BraketTarget {
    fn profile(&self) -> &TargetProfile {
        &self.profile
    }

    fn compile(&self, circuit: &Circuit) -> CompileOutcome {
        skinfaxi_compile::compile_for(&self.profile, circuit)
    }

    #[instrument(skip(self, circuit), fields(device = %self.profile.device))]
    async fn execute(&self, circuit: &Circuit, shots: u32) -> HalResult<Counts> {
        if shots == 0 || shots > self.profile.max_shots {
            return Err(HalError::InvalidShots(format!(
                "Shot count must be between 1 and {}",
                self.profile.max_shots
            )));
        }

        let program = Self::to_openqasm3(circuit).map_err(HalError::from)?;
        let task_arn = self
            .client
            .create_task(&self.device_arn, &program, shots)
            .await
            .map_err(HalError::from)?;
        info!("Braket task created: {}", task_arn);

        let task = self.await_completion(&task_arn).await.map_err(HalError::from)?;
        let result = self.client.fetch_result(&task).await.map_err(HalError::from)?;
        Ok(result.to_counts(shots))
    }
}

/// Provider for devices hosted on AWS Braket.
///
/// Requires `aws-access-key-id` and `aws-secret-access-key` parameters;
/// `region` is optional and only used for devices without a fixed region.
pub struct BraketProvider {
    default_region: String,
}

impl BraketProvider {
    /// Create the provider, honoring `BRAKET_DEFAULT_REGION`.
    pub fn new() -> Self {
        Self {
            default_region: std::env::var("BRAKET_DEFAULT_REGION")
                .unwrap_or_else(|_| DEFAULT_REGION.to_string()),
        }
    }
}

impl Default for BraketProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetProvider for BraketProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn credentials(&self, params: &TypedParams) -> HalResult<Credentials> {
        Credentials::access_keys_from_params(PROVIDER_NAME, params, &self.default_region)
    }

    async fn resolve(
        &self,
        device: &str,
        credentials: &Credentials,
    ) -> HalResult<Arc<dyn Target>> {
        let Some(spec) = lookup(device) else {
            return Err(HalError::TargetNotFound {
                provider: PROVIDER_NAME.to_string(),
                device: device.to_string(),
            });
        };

        // QPUs live in fixed regions; simulators follow the credentials.
        let region = if spec.is_simulator {
            match credentials {
                Credentials::AccessKeys { region, .. } => region.clone(),
                _ => self.default_region.clone(),
            }
        } else {
            spec.region().to_string()
        };

        debug!("Resolved Braket device {} in {}", spec.name, region);
        let client = BraketClient::new(credentials, &region)
            .await
            .map_err(HalError::from)?;
        Ok(Arc::new(BraketTarget::new(Arc::new(client), &spec)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openqasm3_serialization() {
        let program = BraketTarget::to_openqasm3(&Circuit::bell()).unwrap();
        assert!(program.starts_with("OPENQASM 3.0;\n"));
        assert!(program.contains("qubit[2] q;"));
        assert!(program.contains("bit[2] c;"));
        assert!(program.contains("h q[0];"));
        assert!(program.contains("cx q[0], q[1];"));
        assert!(program.contains("c[0] = measure q[0];"));
    }

    #[test]
    fn test_openqasm3_renders_angles() {
        let mut circuit = Circuit::with_size("r", 1, 0);
        circuit.rz(0.5, 0).unwrap();
        let program = BraketTarget::to_openqasm3(&circuit).unwrap();
        assert!(program.contains("rz(0.5) q[0];"));
    }

    #[test]
    fn test_openqasm3_drops_barriers() {
        let mut circuit = Circuit::with_size("b", 2, 0);
        circuit.h(0).unwrap();
        circuit.barrier_all().unwrap();
        let program = BraketTarget::to_openqasm3(&circuit).unwrap();
        assert!(!program.contains("barrier"));
    }

    #[test]
    fn test_openqasm3_rejects_custom_gates() {
        use skinfaxi_ir::CustomGate;
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.gate(CustomGate::new("mystery", 2), [0, 1]).unwrap();
        assert!(matches!(
            BraketTarget::to_openqasm3(&circuit),
            Err(BraketError::UnsupportedGate(name)) if name == "mystery"
        ));
    }
}
