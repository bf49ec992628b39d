//! Persisted job records.
//!
//! Records follow a strict lifecycle: created empty (`complete = false`)
//! when a job is accepted, completed exactly once by the job that owns the
//! id, never deleted here (retention belongs to the host). The store
//! enforces the exactly-once completion; this module only defines the
//! shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use skinfaxi_hal::Counts;
use skinfaxi_ir::CircuitStats;
use skinfaxi_types::{ExchangeFormat, TypedParams};

/// Identifier of an asynchronous job and of the record it owns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Result record of an execute job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    /// The owning job's id.
    pub id: JobId,
    /// Device the job targets.
    pub backend: String,
    /// Requested shot count.
    pub shots: u32,
    /// Terminal payload: `{"counts": ...}` or `{"error": ...}`.
    pub payload: Option<Value>,
    /// Whether the job reached a terminal state.
    pub complete: bool,
    /// Correlation to a generated-circuit record, if any.
    pub generated_circuit_id: Option<JobId>,
    /// Value returned by the post-processing entry point, if any.
    pub post_processing_result: Option<Value>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl ResultRecord {
    /// Create the empty record written at submission time.
    pub fn pending(id: JobId, backend: impl Into<String>, shots: u32) -> Self {
        Self {
            id,
            backend: backend.into(),
            shots,
            payload: None,
            complete: false,
            generated_circuit_id: None,
            post_processing_result: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a correlation id at submission time.
    #[must_use]
    pub fn with_generated_circuit(mut self, id: JobId) -> Self {
        self.generated_circuit_id = Some(id);
        self
    }

    /// The success payload shape.
    pub fn counts_payload(counts: &Counts) -> Value {
        json!({ "counts": counts.to_json() })
    }

    /// The failure payload shape.
    pub fn error_payload(message: impl AsRef<str>) -> Value {
        json!({ "error": message.as_ref() })
    }
}

/// Record of a generate job: the circuit it produced, or why it failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedCircuitRecord {
    /// The owning job's id.
    pub id: JobId,
    /// Serialization of the generated circuit.
    pub serialization: Option<String>,
    /// Format of the serialization.
    pub language: ExchangeFormat,
    /// Input parameters of the generation request, replayed by a dependent
    /// execute job's post-processing step.
    pub input_params: TypedParams,
    /// Statistics of the generated circuit before any target adaptation.
    pub stats: Option<CircuitStats>,
    /// Failure reason; a failed generate job still completes.
    pub error: Option<String>,
    /// Whether the job reached a terminal state.
    pub complete: bool,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl GeneratedCircuitRecord {
    /// Create the empty record written at submission time.
    pub fn pending(id: JobId, input_params: TypedParams) -> Self {
        Self {
            id,
            serialization: None,
            language: ExchangeFormat::Qasm,
            input_params,
            stats: None,
            error: None,
            complete: false,
            created_at: Utc::now(),
        }
    }
}

/// Terminal state of a generate job.
#[derive(Debug, Clone)]
pub enum GeneratedOutcome {
    /// Generation produced a circuit.
    Circuit {
        /// Serialized circuit text.
        serialization: String,
        /// Statistics of the generated circuit.
        stats: CircuitStats,
    },
    /// Generation failed.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_record_is_incomplete() {
        let record = ResultRecord::pending(JobId::random(), "statevector_simulator", 1024);
        assert!(!record.complete);
        assert!(record.payload.is_none());
        assert!(record.generated_circuit_id.is_none());
    }

    #[test]
    fn test_payload_shapes() {
        let counts = Counts::from_pairs([("00", 512u64), ("11", 512u64)]);
        let success = ResultRecord::counts_payload(&counts);
        assert_eq!(success["counts"]["00"], 512);

        let failure = ResultRecord::error_payload("too many qubits required");
        assert_eq!(failure["error"], "too many qubits required");
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = ResultRecord::pending(JobId::from("job-1"), "dev", 100)
            .with_generated_circuit(JobId::from("gen-1"));
        let json = serde_json::to_string(&record).unwrap();
        let back: ResultRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, JobId::from("job-1"));
        assert_eq!(back.generated_circuit_id, Some(JobId::from("gen-1")));
    }
}
