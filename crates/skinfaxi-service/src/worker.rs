//! The job worker.
//!
//! One worker processes one job to completion before taking the next; the
//! only state it shares with other workers is the record store, and it only
//! completes the record keyed by the job it is running. Every terminal
//! outcome — success or failure — marks the record complete, so the poll
//! interface never reports success by omission.
//!
//! Credentials are rebuilt from the job's own parameters on every run; no
//! authentication state survives between jobs.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument, warn};

use skinfaxi_compile::{DefaultLayout, Pass};
use skinfaxi_hal::{Counts, ProviderRegistry, Target};
use skinfaxi_ir::Circuit;
use skinfaxi_pipeline::{ProgramLoader, adapt_for_target, canonicalize_program};
use skinfaxi_types::TypedValue;

use crate::error::ServiceResult;
use crate::queue::{CircuitSource, ExecuteJob, GenerateJob, JobPayload, JobQueue};
use crate::record::{GeneratedOutcome, ResultRecord};
use crate::store::RecordStore;

/// Processes execute and generate jobs.
pub struct Worker {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn RecordStore>,
    loader: Arc<dyn ProgramLoader>,
}

impl Worker {
    /// Create a worker over the given registry, store, and loader.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        store: Arc<dyn RecordStore>,
        loader: Arc<dyn ProgramLoader>,
    ) -> Self {
        Self {
            registry,
            store,
            loader,
        }
    }

    /// Process one job to completion.
    pub async fn process(&self, payload: JobPayload) -> ServiceResult<()> {
        match payload {
            JobPayload::Execute(job) => self.run_execute(job).await,
            JobPayload::Generate(job) => self.run_generate(job).await,
        }
    }

    /// Drain a queue, processing jobs in order. Returns how many ran.
    pub async fn drain(&self, queue: &dyn JobQueue) -> ServiceResult<usize> {
        let mut processed = 0;
        while let Some(payload) = queue.fetch().await? {
            self.process(payload).await?;
            processed += 1;
        }
        Ok(processed)
    }

    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn run_execute(&self, job: ExecuteJob) -> ServiceResult<()> {
        match self.execute_inner(&job).await {
            Ok(counts) => {
                info!("Job {} produced {} distinct outcomes", job.id, counts.len());
                self.store
                    .complete_result(&job.id, ResultRecord::counts_payload(&counts))
                    .await?;
                self.chain_post_processing(&job, &counts).await?;
            }
            Err(reason) => {
                warn!("Job {} failed: {}", job.id, reason);
                self.store
                    .complete_result(&job.id, ResultRecord::error_payload(&reason))
                    .await?;
            }
        }
        Ok(())
    }

    /// Everything that can fail between dispatch and counts, with failures
    /// flattened to the message stored on the record.
    async fn execute_inner(&self, job: &ExecuteJob) -> Result<Counts, String> {
        let target = self
            .registry
            .resolve(&job.provider, &job.device, &job.input_params)
            .await
            .map_err(|e| e.to_string())?;

        let mut circuit = self.obtain_circuit(job, target.as_ref()).await?;

        // Some targets reject uppercase register identifiers.
        circuit.normalize_register_names();

        target
            .execute(&circuit, job.shots)
            .await
            .map_err(|e| e.to_string())
    }

    /// Obtain a circuit from the job's input shape.
    async fn obtain_circuit(
        &self,
        job: &ExecuteJob,
        target: &dyn Target,
    ) -> Result<Circuit, String> {
        match &job.source {
            CircuitSource::Locator { locator, language } => {
                let loaded = self
                    .loader
                    .load(locator, *language, &job.input_params, job.bearer_token.as_deref())
                    .await
                    .map_err(|e| e.to_string())?;
                info!("Loaded implementation {}", loaded.display_name);
                let report =
                    adapt_for_target(&loaded.program, target).map_err(|e| e.to_string())?;
                Ok(report.circuit)
            }
            CircuitSource::TranspiledQasm(text) => {
                let circuit = skinfaxi_qasm::parse(text)
                    .map_err(|e| format!("Invalid transpiled QASM: {e}"))?;
                let report = target.validate(&circuit);
                if !report.is_valid() {
                    return Err(format!(
                        "Transpiled QASM is not valid for {}: {}",
                        target.profile().device,
                        report.describe()
                    ));
                }
                Ok(circuit)
            }
            CircuitSource::TranspiledQuil(text) => {
                let mut circuit = skinfaxi_quil::parse(text)
                    .map_err(|e| format!("Invalid transpiled Quil: {e}"))?;
                let mut report = target.validate(&circuit);
                // Quil round trips lose qubit placement; one default-mapping
                // pass may repair a purely structural failure. Never twice.
                if !report.is_valid() && report.is_placement_only() {
                    DefaultLayout
                        .run(&mut circuit)
                        .map_err(|e| format!("Layout repair failed: {e}"))?;
                    report = target.validate(&circuit);
                }
                if !report.is_valid() {
                    return Err(format!(
                        "Transpiled Quil is not valid for {}: {}",
                        target.profile().device,
                        report.describe()
                    ));
                }
                Ok(circuit)
            }
        }
    }

    /// Feed the counts back into the generating implementation.
    ///
    /// Only locator-input jobs chain: a pre-compiled artifact has no
    /// implementation to re-invoke. Post-processing failures land on the
    /// record as an error value; the counts are already persisted.
    async fn chain_post_processing(&self, job: &ExecuteJob, counts: &Counts) -> ServiceResult<()> {
        let Some(correlation_id) = &job.correlation_id else {
            return Ok(());
        };
        let CircuitSource::Locator { locator, language } = &job.source else {
            return Ok(());
        };

        let value = match self.store.generated(correlation_id).await? {
            Some(generated) => {
                let mut params = generated.input_params.clone();
                params.insert("counts", TypedValue::Str(counts.to_json().to_string()));
                match self
                    .loader
                    .post_process(locator, *language, &params, job.bearer_token.as_deref())
                    .await
                {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("Post-processing for {} failed: {}", job.id, e);
                        json!({ "error": e.to_string() })
                    }
                }
            }
            None => {
                warn!(
                    "Job {} references unknown generated circuit {}",
                    job.id, correlation_id
                );
                json!({ "error": format!("generated circuit {correlation_id} not found") })
            }
        };

        self.store.attach_post_processing(&job.id, value).await
    }

    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn run_generate(&self, job: GenerateJob) -> ServiceResult<()> {
        let outcome = match self.generate_inner(&job).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!("Generate job {} failed: {}", job.id, reason);
                GeneratedOutcome::Error(reason)
            }
        };
        self.store.complete_generated(&job.id, outcome).await
    }

    async fn generate_inner(&self, job: &GenerateJob) -> Result<GeneratedOutcome, String> {
        let loaded = self
            .loader
            .load(
                &job.locator,
                job.language,
                &job.input_params,
                job.bearer_token.as_deref(),
            )
            .await
            .map_err(|e| e.to_string())?;

        let canonical = canonicalize_program(&loaded.program).map_err(|e| e.to_string())?;
        Ok(GeneratedOutcome::Circuit {
            serialization: skinfaxi_qasm::emit(&canonical.circuit),
            stats: canonical.stats,
        })
    }
}
