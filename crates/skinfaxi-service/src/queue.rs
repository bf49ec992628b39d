//! Job queue contract and payload shapes.
//!
//! Only the submit/fetch contract is modeled; scheduling, retries, and the
//! execution budget live in the queue backend. Workers fetch one payload at
//! a time and run it to completion.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use skinfaxi_types::{ProgramLocator, SourceLanguage, TypedParams};

use crate::error::ServiceResult;
use crate::record::JobId;

/// Where an execute job gets its circuit from. The three shapes are
/// mutually exclusive by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CircuitSource {
    /// A program locator; drives the full adaptation state machine.
    Locator {
        /// Where the program lives.
        locator: ProgramLocator,
        /// Its declared language.
        language: SourceLanguage,
    },
    /// Pre-transpiled OpenQASM; validated directly, never adapted.
    TranspiledQasm(String),
    /// Pre-transpiled Quil; validated directly, with one layout repair
    /// allowed for lost qubit placement.
    TranspiledQuil(String),
}

/// Payload of an execute job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteJob {
    /// Job id; also the key of the result record this job owns.
    pub id: JobId,
    /// Target provider name.
    pub provider: String,
    /// Target device name.
    pub device: String,
    /// Circuit input.
    pub source: CircuitSource,
    /// Typed request parameters (credentials included).
    pub input_params: TypedParams,
    /// Shot count.
    pub shots: u32,
    /// Bearer token for protected implementation URLs.
    pub bearer_token: Option<String>,
    /// Reference to a previously generated circuit, enabling
    /// post-processing after execution.
    pub correlation_id: Option<JobId>,
}

/// Payload of a generate job: canonicalization and statistics only, no
/// target and no execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateJob {
    /// Job id; also the key of the generated-circuit record this job owns.
    pub id: JobId,
    /// Where the program lives.
    pub locator: ProgramLocator,
    /// Its declared language.
    pub language: SourceLanguage,
    /// Typed request parameters, persisted for later post-processing.
    pub input_params: TypedParams,
    /// Bearer token for protected implementation URLs.
    pub bearer_token: Option<String>,
}

/// A unit of asynchronous work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JobPayload {
    /// Execute a circuit and persist its counts.
    Execute(ExecuteJob),
    /// Generate a circuit and persist its serialization.
    Generate(GenerateJob),
}

impl JobPayload {
    /// Id of the record this job owns.
    pub fn id(&self) -> &JobId {
        match self {
            JobPayload::Execute(job) => &job.id,
            JobPayload::Generate(job) => &job.id,
        }
    }
}

/// Submit/fetch contract of the job queue.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job.
    async fn submit(&self, job: JobPayload) -> ServiceResult<()>;

    /// Take the next job, if any.
    async fn fetch(&self) -> ServiceResult<Option<JobPayload>>;
}

/// FIFO in-memory queue for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryQueue {
    jobs: Mutex<VecDeque<JobPayload>>,
}

impl MemoryQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs.
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// Whether the queue is empty.
    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn submit(&self, job: JobPayload) -> ServiceResult<()> {
        self.jobs.lock().await.push_back(job);
        Ok(())
    }

    async fn fetch(&self) -> ServiceResult<Option<JobPayload>> {
        Ok(self.jobs.lock().await.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_job(id: &str) -> JobPayload {
        JobPayload::Generate(GenerateJob {
            id: JobId::from(id),
            locator: ProgramLocator::inline("OPENQASM 2.0;"),
            language: SourceLanguage::OpenQasm,
            input_params: TypedParams::new(),
            bearer_token: None,
        })
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = MemoryQueue::new();
        queue.submit(generate_job("a")).await.unwrap();
        queue.submit(generate_job("b")).await.unwrap();

        assert_eq!(queue.len().await, 2);
        assert_eq!(queue.fetch().await.unwrap().unwrap().id(), &JobId::from("a"));
        assert_eq!(queue.fetch().await.unwrap().unwrap().id(), &JobId::from("b"));
        assert!(queue.fetch().await.unwrap().is_none());
    }

    #[test]
    fn test_payload_serde_round_trip() {
        let job = JobPayload::Execute(ExecuteJob {
            id: JobId::from("e-1"),
            provider: "sim".into(),
            device: "statevector_simulator".into(),
            source: CircuitSource::TranspiledQasm("OPENQASM 2.0;".into()),
            input_params: TypedParams::new(),
            shots: 1024,
            bearer_token: None,
            correlation_id: Some(JobId::from("g-1")),
        });
        let json = serde_json::to_string(&job).unwrap();
        let back: JobPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), &JobId::from("e-1"));
    }
}
