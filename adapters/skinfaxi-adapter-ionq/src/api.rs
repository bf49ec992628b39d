//! IonQ REST API client.
//!
//! Implements the subset of the IonQ cloud API (`https://api.ionq.co/v0.3`)
//! the provider needs: the backend catalog, job submission in the
//! `ionq.circuit.v0` JSON format, and result retrieval.

// Response fields are deserialized in full even where not yet consumed.
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{IonqError, IonqResult};

/// IonQ cloud API base URL.
pub const BASE_URL: &str = "https://api.ionq.co/v0.3";

/// IonQ REST API client.
///
/// Authenticates with `Authorization: apiKey <token>`.
pub struct IonqClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for IonqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IonqClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl IonqClient {
    /// Create a client for the production endpoint.
    ///
    /// Reads `IONQ_PORTAL_URL` to override the base URL (useful for tests
    /// and proxies).
    pub fn new(api_key: impl Into<String>) -> IonqResult<Self> {
        let base_url = std::env::var("IONQ_PORTAL_URL").unwrap_or_else(|_| BASE_URL.to_string());
        Self::with_base_url(base_url, api_key)
    }

    /// Create a client targeting a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> IonqResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn auth_header(&self) -> String {
        format!("apiKey {}", self.api_key)
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> IonqResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> IonqResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> IonqResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IonqError::Unauthorized(message))
            }
            StatusCode::NOT_FOUND => Err(IonqError::JobNotFound(message)),
            _ => Err(IonqError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Public API methods
    // -----------------------------------------------------------------------

    /// List available backends with their qubit counts.
    #[instrument(skip(self))]
    pub async fn list_backends(&self) -> IonqResult<Vec<BackendInfo>> {
        self.get("backends").await
    }

    /// Submit a circuit job.
    #[instrument(skip(self, request))]
    pub async fn submit_job(&self, request: &JobRequest) -> IonqResult<JobCreated> {
        debug!("Submitting circuit to IonQ target {}", request.target);
        self.post("jobs", request).await
    }

    /// Fetch job status.
    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: &str) -> IonqResult<JobInfo> {
        self.get(&format!("jobs/{job_id}")).await
    }

    /// Fetch the probability histogram of a completed job.
    ///
    /// Keys are decimal representations of the measured state.
    #[instrument(skip(self))]
    pub async fn get_results(&self, job_id: &str) -> IonqResult<HashMap<String, f64>> {
        self.get(&format!("jobs/{job_id}/results")).await
    }
}

// ---------------------------------------------------------------------------
// Circuit operation types (ionq.circuit.v0 JSON format)
// ---------------------------------------------------------------------------

/// One operation in the IonQ JSON circuit format.
#[derive(Debug, Clone, Serialize)]
pub struct IonqOp {
    /// Gate name (`h`, `cnot`, `rx`, ...).
    pub gate: String,
    /// Target qubit for single-target gates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    /// Multiple targets (e.g. `swap`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<u32>,
    /// Control qubit for controlled gates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<u32>,
    /// Rotation angle in radians, for parameterized gates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl IonqOp {
    /// Single-target gate.
    pub fn on_target(gate: impl Into<String>, target: u32) -> Self {
        Self {
            gate: gate.into(),
            target: Some(target),
            targets: vec![],
            control: None,
            rotation: None,
        }
    }

    /// Attach a rotation angle.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Attach a control qubit.
    #[must_use]
    pub fn with_control(mut self, control: u32) -> Self {
        self.control = Some(control);
        self
    }

    /// Multi-target gate.
    pub fn on_targets(gate: impl Into<String>, targets: Vec<u32>) -> Self {
        Self {
            gate: gate.into(),
            target: None,
            targets,
            control: None,
            rotation: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response serde types
// ---------------------------------------------------------------------------

/// Request body for `POST /jobs`.
#[derive(Debug, Serialize)]
pub struct JobRequest {
    /// Backend to run on (`simulator`, `qpu.harmony`, `qpu.aria-1`, ...).
    pub target: String,
    /// Number of shots.
    pub shots: u32,
    /// Job label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The circuit payload.
    pub input: CircuitInput,
}

impl JobRequest {
    /// Create a job request for a circuit.
    pub fn new(target: impl Into<String>, shots: u32, qubits: u32, circuit: Vec<IonqOp>) -> Self {
        Self {
            target: target.into(),
            shots,
            name: Some(format!("skinfaxi-{}", uuid::Uuid::new_v4())),
            input: CircuitInput {
                format: "ionq.circuit.v0",
                qubits,
                circuit,
            },
        }
    }
}

/// The `input` payload of a job request.
#[derive(Debug, Serialize)]
pub struct CircuitInput {
    /// Payload format tag.
    pub format: &'static str,
    /// Number of qubits.
    pub qubits: u32,
    /// Operation list.
    pub circuit: Vec<IonqOp>,
}

/// Response from `POST /jobs`.
#[derive(Debug, Deserialize)]
pub struct JobCreated {
    /// Assigned job id.
    pub id: String,
    /// Initial status.
    pub status: String,
}

/// Response from `GET /jobs/{id}`.
#[derive(Debug, Deserialize)]
pub struct JobInfo {
    /// Job id.
    pub id: String,
    /// Status: `submitted | ready | running | completed | canceled | failed`.
    pub status: String,
    /// Failure detail, present when `status == "failed"`.
    #[serde(default)]
    pub failure: Option<JobFailure>,
}

impl JobInfo {
    /// Whether the job is still in flight.
    pub fn is_pending(&self) -> bool {
        matches!(
            self.status.to_lowercase().as_str(),
            "submitted" | "ready" | "running"
        )
    }

    /// Whether the job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.status.to_lowercase() == "completed"
    }

    /// Whether the job ended in failure or cancellation.
    pub fn is_failed(&self) -> bool {
        matches!(self.status.to_lowercase().as_str(), "failed" | "canceled")
    }
}

/// Failure detail of a job.
#[derive(Debug, Deserialize)]
pub struct JobFailure {
    /// Error class.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// Backend descriptor from `GET /backends`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Backend name (`simulator`, `qpu.harmony`, `qpu.aria-1`, ...).
    pub backend: String,
    /// Number of qubits.
    #[serde(default)]
    pub qubits: u32,
    /// Availability status.
    #[serde(default)]
    pub status: Option<String>,
}

impl BackendInfo {
    /// Whether the backend is taking jobs.
    pub fn is_available(&self) -> bool {
        self.status
            .as_deref()
            .is_none_or(|s| matches!(s.to_lowercase().as_str(), "available" | "running"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_target_op_serialization() {
        let op = IonqOp::on_target("h", 0);
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""gate":"h""#));
        assert!(json.contains(r#""target":0"#));
        assert!(!json.contains("control"));
        assert!(!json.contains("rotation"));
    }

    #[test]
    fn test_controlled_rotation_serialization() {
        let op = IonqOp::on_target("rx", 1).with_rotation(1.5).with_control(0);
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""control":0"#));
        assert!(json.contains(r#""rotation":1.5"#));
    }

    #[test]
    fn test_multi_target_serialization() {
        let op = IonqOp::on_targets("swap", vec![0, 2]);
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""targets":[0,2]"#));
        assert!(!json.contains(r#""target":"#));
    }

    #[test]
    fn test_job_request_shape() {
        let request = JobRequest::new("qpu.harmony", 100, 2, vec![IonqOp::on_target("h", 0)]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"]["format"], "ionq.circuit.v0");
        assert_eq!(json["input"]["qubits"], 2);
        assert_eq!(json["shots"], 100);
    }

    #[test]
    fn test_job_info_status_predicates() {
        let mut info = JobInfo {
            id: "j".into(),
            status: "running".into(),
            failure: None,
        };
        assert!(info.is_pending());
        info.status = "completed".into();
        assert!(info.is_completed());
        info.status = "canceled".into();
        assert!(info.is_failed());
    }
}
