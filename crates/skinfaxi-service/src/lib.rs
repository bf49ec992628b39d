//! Job records, queue contract, worker, and synchronous operations.
//!
//! This crate ties the pipeline to the outside world:
//!
//! - [`Service`] exposes the synchronous operations (analyze, transpile,
//!   execute, generate, poll, version) the transport layer binds to,
//! - [`Worker`] runs enqueued execute/generate jobs to completion,
//! - [`RecordStore`] and [`JobQueue`] are the persistence and queue
//!   contracts, with in-memory and JSON-file implementations bundled,
//! - [`ServiceConfig`] is the env-backed configuration surface.
//!
//! The concurrency invariant of the whole system lives here: at most one
//! job ever completes a given record, exactly once, and the store rejects
//! anything else.

pub mod config;
pub mod error;
pub mod ops;
pub mod queue;
pub mod record;
pub mod store;
pub mod worker;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use ops::{
    Accepted, AnalyzeRequest, AnalyzeResponse, ExecuteRequest, GenerateRequest,
    GeneratedPollResponse, OriginalStats, PollResponse, SERVICE_VERSION, Service,
    TranspileOutcome, TranspileRequest, TranspileResponse,
};
pub use queue::{CircuitSource, ExecuteJob, GenerateJob, JobPayload, JobQueue, MemoryQueue};
pub use record::{GeneratedCircuitRecord, GeneratedOutcome, JobId, ResultRecord};
pub use store::{JsonStore, MemoryStore, RecordStore};
pub use worker::Worker;
