//! AWS Braket API client wrapper.
//!
//! Wraps the AWS SDKs for Braket and S3 behind the three calls the target
//! needs: create a quantum task, poll its status, and fetch `results.json`
//! from the task's output location. The client is built from the explicit
//! per-request credentials — nothing is read from the ambient AWS
//! credential chain.

// Response fields are deserialized in full even where not yet consumed.
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument};

use skinfaxi_hal::{Counts, Credentials};

use crate::error::{BraketError, BraketResult};

/// Default S3 bucket for task outputs; override with `BRAKET_RESULTS_BUCKET`.
const DEFAULT_RESULTS_BUCKET: &str = "amazon-braket-skinfaxi-results";

/// S3 key prefix for task outputs.
const RESULTS_PREFIX: &str = "skinfaxi-tasks";

/// AWS Braket API client.
pub struct BraketClient {
    braket: aws_sdk_braket::Client,
    s3: aws_sdk_s3::Client,
    s3_bucket: String,
    region: String,
}

impl std::fmt::Debug for BraketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraketClient")
            .field("s3_bucket", &self.s3_bucket)
            .field("region", &self.region)
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}

impl BraketClient {
    /// Build a client from explicit access-key credentials.
    ///
    /// `region` overrides the credential region when the device lives in a
    /// fixed region (Rigetti in `us-west-1`, IonQ in `us-east-1`).
    pub async fn new(credentials: &Credentials, region: &str) -> BraketResult<Self> {
        let Credentials::AccessKeys {
            access_key_id,
            secret_access_key,
            ..
        } = credentials
        else {
            return Err(BraketError::MissingCredentials);
        };

        let static_credentials = aws_sdk_braket::config::Credentials::new(
            access_key_id.clone(),
            secret_access_key.clone(),
            None,
            None,
            "skinfaxi",
        );

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .credentials_provider(static_credentials)
            .timeout_config(
                aws_config::timeout::TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(60))
                    .connect_timeout(Duration::from_secs(10))
                    .build(),
            )
            .load()
            .await;

        let s3_bucket = std::env::var("BRAKET_RESULTS_BUCKET")
            .unwrap_or_else(|_| DEFAULT_RESULTS_BUCKET.to_string());

        Ok(Self {
            braket: aws_sdk_braket::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
            s3_bucket,
            region: region.to_string(),
        })
    }

    /// Create a quantum task running an OpenQASM program.
    #[instrument(skip(self, openqasm))]
    pub async fn create_task(
        &self,
        device_arn: &str,
        openqasm: &str,
        shots: u32,
    ) -> BraketResult<String> {
        let action = serde_json::json!({
            "braketSchemaHeader": {
                "name": "braket.ir.openqasm.program",
                "version": "1"
            },
            "source": openqasm
        });

        let response = self
            .braket
            .create_quantum_task()
            .device_arn(device_arn)
            .action(action.to_string())
            .shots(i64::from(shots))
            .output_s3_bucket(&self.s3_bucket)
            .output_s3_key_prefix(RESULTS_PREFIX)
            .send()
            .await
            .map_err(|e| BraketError::BraketApi(e.to_string()))?;

        Ok(response.quantum_task_arn().to_string())
    }

    /// Fetch task status and output location.
    #[instrument(skip(self))]
    pub async fn get_task(&self, task_arn: &str) -> BraketResult<TaskInfo> {
        let response = self
            .braket
            .get_quantum_task()
            .quantum_task_arn(task_arn)
            .send()
            .await
            .map_err(|e| BraketError::BraketApi(e.to_string()))?;

        let status = match response.status() {
            aws_sdk_braket::types::QuantumTaskStatus::Completed => TaskStatus::Completed,
            aws_sdk_braket::types::QuantumTaskStatus::Failed => TaskStatus::Failed,
            aws_sdk_braket::types::QuantumTaskStatus::Cancelled
            | aws_sdk_braket::types::QuantumTaskStatus::Cancelling => TaskStatus::Cancelled,
            _ => TaskStatus::Pending,
        };

        Ok(TaskInfo {
            status,
            failure_reason: response.failure_reason().map(ToString::to_string),
            output_bucket: response.output_s3_bucket().to_string(),
            output_directory: response.output_s3_directory().to_string(),
        })
    }

    /// Download and parse `results.json` for a completed task.
    #[instrument(skip(self, task))]
    pub async fn fetch_result(&self, task: &TaskInfo) -> BraketResult<TaskResult> {
        let key = format!("{}/results.json", task.output_directory);
        debug!("Fetching s3://{}/{}", task.output_bucket, key);

        let object = self
            .s3
            .get_object()
            .bucket(&task.output_bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| BraketError::S3(e.to_string()))?;

        let bytes = object
            .body
            .collect()
            .await
            .map_err(|e| BraketError::S3(e.to_string()))?
            .into_bytes();

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Task status, collapsed to what the poll loop distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Created, queued, or running.
    Pending,
    /// Finished successfully.
    Completed,
    /// Ended in failure.
    Failed,
    /// Cancelled before completion.
    Cancelled,
}

/// Status and output location of a quantum task.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    /// Current status.
    pub status: TaskStatus,
    /// Failure detail, when failed.
    pub failure_reason: Option<String>,
    /// Bucket the results were written to.
    pub output_bucket: String,
    /// Key prefix of the task's output objects.
    pub output_directory: String,
}

/// The measurement section of `results.json`.
///
/// Which field is present depends on the device and result type; counts are
/// preferred, then raw measurements, then probabilities.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    /// Raw per-shot measurements.
    #[serde(default)]
    pub measurements: Option<Vec<Vec<u8>>>,
    /// Aggregated bitstring counts.
    #[serde(default)]
    pub measurement_counts: Option<HashMap<String, u64>>,
    /// Outcome probabilities.
    #[serde(default)]
    pub measurement_probabilities: Option<HashMap<String, f64>>,
}

impl TaskResult {
    /// Convert the result into counts.
    ///
    /// `submitted_shots` scales probability-only results.
    pub fn to_counts(&self, submitted_shots: u32) -> Counts {
        let mut counts = Counts::new();

        if let Some(measurement_counts) = &self.measurement_counts {
            for (bits, &count) in measurement_counts {
                counts.insert(bits.clone(), count);
            }
            return counts;
        }

        if let Some(measurements) = &self.measurements {
            for shot in measurements {
                let bits: String = shot
                    .iter()
                    .map(|&b| if b == 0 { '0' } else { '1' })
                    .collect();
                counts.insert(bits, 1);
            }
            return counts;
        }

        if let Some(probabilities) = &self.measurement_probabilities {
            let total = f64::from(submitted_shots.max(1));
            for (bits, &probability) in probabilities {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let count = (probability * total).round() as u64;
                if count > 0 {
                    counts.insert(bits.clone(), count);
                }
            }
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_preferred_over_measurements() {
        let result: TaskResult = serde_json::from_value(serde_json::json!({
            "measurementCounts": {"00": 3, "11": 7},
            "measurements": [[0, 0]]
        }))
        .unwrap();
        let counts = result.to_counts(10);
        assert_eq!(counts.get("11"), 7);
        assert_eq!(counts.total_shots(), 10);
    }

    #[test]
    fn test_measurements_aggregate() {
        let result: TaskResult = serde_json::from_value(serde_json::json!({
            "measurements": [[0, 0], [1, 1], [0, 0]]
        }))
        .unwrap();
        let counts = result.to_counts(3);
        assert_eq!(counts.get("00"), 2);
        assert_eq!(counts.get("11"), 1);
    }

    #[test]
    fn test_probabilities_scale_by_shots() {
        let result: TaskResult = serde_json::from_value(serde_json::json!({
            "measurementProbabilities": {"00": 0.25, "11": 0.75}
        }))
        .unwrap();
        let counts = result.to_counts(400);
        assert_eq!(counts.get("00"), 100);
        assert_eq!(counts.get("11"), 300);
    }

    #[test]
    fn test_empty_result() {
        let result: TaskResult = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(result.to_counts(100).is_empty());
    }
}
