//! Synchronous operations.
//!
//! The request/response shapes the transport layer (out of scope here)
//! binds to. Analyze and transpile run the adaptation machine inline;
//! execute and generate enqueue a job and answer with a poll location.
//!
//! Field names follow the external API convention (`impl-language`,
//! `qpu-name`), so these types serialize straight into the wire format.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use skinfaxi_hal::{HalError, ProviderRegistry};
use skinfaxi_ir::CircuitStats;
use skinfaxi_pipeline::{AdaptError, ProgramLoader, adapt_for_target, canonicalize_program};
use skinfaxi_types::{ExchangeFormat, ProgramLocator, SourceLanguage, TypedParams};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::queue::{CircuitSource, ExecuteJob, GenerateJob, JobPayload, JobQueue};
use crate::record::{GeneratedCircuitRecord, JobId, ResultRecord};
use crate::store::RecordStore;

/// Service version reported by the version operation.
pub const SERVICE_VERSION: &str = "1.0";

/// The synchronous face of the service.
pub struct Service {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn RecordStore>,
    queue: Arc<dyn JobQueue>,
    loader: Arc<dyn ProgramLoader>,
    config: ServiceConfig,
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

/// Request body of the analyze operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalyzeRequest {
    /// Declared language of the implementation.
    pub impl_language: String,
    /// URL of the implementation.
    #[serde(default)]
    pub impl_url: Option<String>,
    /// Base64-encoded inline implementation.
    #[serde(default)]
    pub impl_data: Option<String>,
    /// Bearer token for protected implementation URLs.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

/// Request body of the transpile operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TranspileRequest {
    /// Target provider name.
    pub provider: String,
    /// Target device name.
    pub qpu_name: String,
    /// Declared language of the implementation.
    pub impl_language: String,
    /// URL of the implementation.
    #[serde(default)]
    pub impl_url: Option<String>,
    /// Base64-encoded inline implementation.
    #[serde(default)]
    pub impl_data: Option<String>,
    /// Raw `{rawValue, type}` parameter mapping.
    #[serde(default)]
    pub input_params: Value,
    /// Bearer token for protected implementation URLs.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

/// Request body of the execute operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecuteRequest {
    /// Target provider name.
    pub provider: String,
    /// Target device name.
    pub qpu_name: String,
    /// Declared language; required with a locator input.
    #[serde(default)]
    pub impl_language: Option<String>,
    /// URL of the implementation.
    #[serde(default)]
    pub impl_url: Option<String>,
    /// Base64-encoded inline implementation.
    #[serde(default)]
    pub impl_data: Option<String>,
    /// Pre-transpiled OpenQASM, bypassing adaptation.
    #[serde(default)]
    pub transpiled_qasm: Option<String>,
    /// Pre-transpiled Quil, bypassing adaptation.
    #[serde(default)]
    pub transpiled_quil: Option<String>,
    /// Raw `{rawValue, type}` parameter mapping.
    #[serde(default)]
    pub input_params: Value,
    /// Shot count; the configured default applies when absent.
    #[serde(default)]
    pub shots: Option<u32>,
    /// Bearer token for protected implementation URLs.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Reference to a completed generate job for post-processing.
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Request body of the generate operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GenerateRequest {
    /// Declared language of the implementation.
    pub impl_language: String,
    /// URL of the implementation.
    #[serde(default)]
    pub impl_url: Option<String>,
    /// Base64-encoded inline implementation.
    #[serde(default)]
    pub impl_data: Option<String>,
    /// Raw `{rawValue, type}` parameter mapping.
    #[serde(default)]
    pub input_params: Value,
    /// Bearer token for protected implementation URLs.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Statistics of the circuit before target adaptation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalStats {
    /// Qubit count.
    #[serde(rename = "original-width")]
    pub width: u32,
    /// Depth with barriers excluded.
    #[serde(rename = "original-depth")]
    pub depth: u32,
    /// Depth over multi-qubit operations.
    #[serde(rename = "original-multi-qubit-gate-depth")]
    pub multi_qubit_gate_depth: u32,
    /// Total operation count.
    #[serde(rename = "original-total-number-of-operations")]
    pub total_number_of_operations: u32,
    /// Single-qubit gate count.
    #[serde(rename = "original-number-of-single-qubit-gates")]
    pub number_of_single_qubit_gates: u32,
    /// Multi-qubit gate count.
    #[serde(rename = "original-number-of-multi-qubit-gates")]
    pub number_of_multi_qubit_gates: u32,
    /// Measurement count.
    #[serde(rename = "original-number-of-measurement-operations")]
    pub number_of_measurement_operations: u32,
}

impl From<CircuitStats> for OriginalStats {
    fn from(stats: CircuitStats) -> Self {
        Self {
            width: stats.width,
            depth: stats.depth,
            multi_qubit_gate_depth: stats.multi_qubit_gate_depth,
            total_number_of_operations: stats.total_operations,
            number_of_single_qubit_gates: stats.single_qubit_gates,
            number_of_multi_qubit_gates: stats.multi_qubit_gates,
            number_of_measurement_operations: stats.measurement_operations,
        }
    }
}

/// Response body of the analyze operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Statistics of the circuit as written.
    #[serde(flatten)]
    pub original: OriginalStats,
}

/// Response body of a successful transpile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TranspileResponse {
    /// Compiled circuit as OpenQASM, when that is the target's format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transpiled_qasm: Option<String>,
    /// Compiled circuit as Quil, for Quil-format targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transpiled_quil: Option<String>,
    /// Label of the serialization format.
    pub language: String,
    /// Statistics before adaptation.
    #[serde(flatten)]
    pub original: OriginalStats,
    /// Qubit count after adaptation.
    pub width: u32,
    /// Depth after adaptation, barriers excluded.
    pub depth: u32,
    /// Multi-qubit depth after adaptation.
    pub multi_qubit_gate_depth: u32,
    /// Operation count after adaptation.
    pub number_of_gates: u32,
    /// Single-qubit gate count after adaptation.
    pub number_of_single_qubit_gates: u32,
    /// Multi-qubit gate count after adaptation.
    pub number_of_multi_qubit_gates: u32,
    /// Measurement count after adaptation.
    pub number_of_measurement_operations: u32,
}

/// Outcome of the transpile operation.
///
/// Qubit overflow and a missing target are ordinary outcomes, not errors:
/// callers distinguish "backend too small" and "no such backend" from hard
/// failures.
#[derive(Debug)]
pub enum TranspileOutcome {
    /// Transpilation succeeded.
    Transpiled(Box<TranspileResponse>),
    /// The target cannot host the circuit. Soft failure.
    TooManyQubits {
        /// Error text for the response body.
        error: String,
    },
    /// No target with the requested name exists.
    TargetNotFound,
}

/// Accepted response of the asynchronous operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accepted {
    /// Job id.
    pub id: JobId,
    /// Poll location for the eventual result.
    pub location: String,
}

/// Response body of the result poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    /// Job id.
    pub id: JobId,
    /// Whether the job reached a terminal state.
    pub complete: bool,
    /// Terminal payload, present once complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Device the job targeted, present once complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Shot count, present once complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shots: Option<u32>,
    /// Post-processing value, when correlation chaining produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_processing_result: Option<Value>,
}

/// Response body of the generated-circuit poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPollResponse {
    /// Job id.
    pub id: JobId,
    /// Whether the job reached a terminal state.
    pub complete: bool,
    /// Serialized circuit, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_circuit: Option<String>,
    /// Serialization format label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Statistics of the generated circuit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CircuitStats>,
    /// Failure reason, present on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl Service {
    /// Create a service over the given collaborators.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        store: Arc<dyn RecordStore>,
        queue: Arc<dyn JobQueue>,
        loader: Arc<dyn ProgramLoader>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            registry,
            store,
            queue,
            loader,
            config,
        }
    }

    /// Analyze an implementation: canonicalize and report statistics.
    #[instrument(skip(self, request))]
    pub async fn analyze(&self, request: AnalyzeRequest) -> ServiceResult<AnalyzeResponse> {
        let language = parse_language(&request.impl_language)?;
        let locator = resolve_locator(request.impl_url.as_deref(), request.impl_data.as_deref())?;

        let loaded = self
            .loader
            .load(
                &locator,
                language,
                &TypedParams::new(),
                request.bearer_token.as_deref(),
            )
            .await
            .map_err(|e| ServiceError::BadRequest(e.to_string()))?;

        let canonical = canonicalize_program(&loaded.program).map_err(client_adapt_error)?;
        info!(
            "Analyzed {}: width={}, depth={}",
            loaded.display_name, canonical.stats.width, canonical.stats.depth
        );
        Ok(AnalyzeResponse {
            original: canonical.stats.into(),
        })
    }

    /// Transpile an implementation for a target.
    #[instrument(skip(self, request), fields(qpu = %request.qpu_name))]
    pub async fn transpile(&self, request: TranspileRequest) -> ServiceResult<TranspileOutcome> {
        let language = parse_language(&request.impl_language)?;
        let locator = resolve_locator(request.impl_url.as_deref(), request.impl_data.as_deref())?;
        let params = TypedParams::from_raw(&request.input_params);

        let loaded = self
            .loader
            .load(&locator, language, &params, request.bearer_token.as_deref())
            .await
            .map_err(|e| ServiceError::BadRequest(e.to_string()))?;

        let target = match self
            .registry
            .resolve(&request.provider, &request.qpu_name, &params)
            .await
        {
            Ok(target) => target,
            Err(HalError::TargetNotFound { .. }) => {
                warn!("{} not found", request.qpu_name);
                return Ok(TranspileOutcome::TargetNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        let report = match adapt_for_target(&loaded.program, target.as_ref()) {
            Ok(report) => report,
            Err(AdaptError::TooManyQubits { .. }) => {
                info!(
                    "Transpile {} for {}: too many qubits required",
                    loaded.display_name, request.qpu_name
                );
                return Ok(TranspileOutcome::TooManyQubits {
                    error: "too many qubits required".to_string(),
                });
            }
            Err(e) => return Err(client_adapt_error(e)),
        };

        let format = target.profile().exchange_format;
        let (transpiled_qasm, transpiled_quil) = match format {
            ExchangeFormat::Qasm => (Some(skinfaxi_qasm::emit(&report.circuit)), None),
            ExchangeFormat::Quil => (None, Some(skinfaxi_quil::emit(&report.circuit))),
        };

        let compiled = report.compiled;
        info!(
            "Transpiled {} for {}: w={}, d={}",
            loaded.display_name, request.qpu_name, compiled.width, compiled.depth
        );
        Ok(TranspileOutcome::Transpiled(Box::new(TranspileResponse {
            transpiled_qasm,
            transpiled_quil,
            language: format.label().to_string(),
            original: report.original.into(),
            width: compiled.width,
            depth: compiled.depth,
            multi_qubit_gate_depth: compiled.multi_qubit_gate_depth,
            number_of_gates: compiled.total_operations,
            number_of_single_qubit_gates: compiled.single_qubit_gates,
            number_of_multi_qubit_gates: compiled.multi_qubit_gates,
            number_of_measurement_operations: compiled.measurement_operations,
        })))
    }

    /// Accept an execute job: create its empty record and enqueue it.
    #[instrument(skip(self, request), fields(qpu = %request.qpu_name))]
    pub async fn execute(&self, request: ExecuteRequest) -> ServiceResult<Accepted> {
        let source = self.execute_source(&request)?;
        let shots = request.shots.unwrap_or(self.config.default_shots);
        let id = JobId::random();
        let correlation_id = request.correlation_id.map(JobId);

        let mut record = ResultRecord::pending(id.clone(), &request.qpu_name, shots);
        if let Some(correlation) = &correlation_id {
            record = record.with_generated_circuit(correlation.clone());
        }
        self.store.insert_result(record).await?;

        self.queue
            .submit(JobPayload::Execute(ExecuteJob {
                id: id.clone(),
                provider: request.provider,
                device: request.qpu_name,
                source,
                input_params: TypedParams::from_raw(&request.input_params),
                shots,
                bearer_token: request.bearer_token,
                correlation_id,
            }))
            .await?;

        info!("Accepted execute job {}", id);
        Ok(Accepted {
            location: format!("/results/{id}"),
            id,
        })
    }

    /// Pick the single circuit input shape of an execute request.
    fn execute_source(&self, request: &ExecuteRequest) -> ServiceResult<CircuitSource> {
        if let Some(qasm) = &request.transpiled_qasm {
            return Ok(CircuitSource::TranspiledQasm(qasm.clone()));
        }
        if let Some(quil) = &request.transpiled_quil {
            return Ok(CircuitSource::TranspiledQuil(quil.clone()));
        }
        let language = request
            .impl_language
            .as_deref()
            .ok_or_else(|| ServiceError::BadRequest("impl-language is required".to_string()))?;
        Ok(CircuitSource::Locator {
            locator: resolve_locator(request.impl_url.as_deref(), request.impl_data.as_deref())?,
            language: parse_language(language)?,
        })
    }

    /// Accept a generate job: create its empty record and enqueue it.
    #[instrument(skip(self, request))]
    pub async fn generate(&self, request: GenerateRequest) -> ServiceResult<Accepted> {
        let language = parse_language(&request.impl_language)?;
        let locator = resolve_locator(request.impl_url.as_deref(), request.impl_data.as_deref())?;
        let params = TypedParams::from_raw(&request.input_params);
        let id = JobId::random();

        self.store
            .insert_generated(GeneratedCircuitRecord::pending(id.clone(), params.clone()))
            .await?;

        self.queue
            .submit(JobPayload::Generate(GenerateJob {
                id: id.clone(),
                locator,
                language,
                input_params: params,
                bearer_token: request.bearer_token,
            }))
            .await?;

        info!("Accepted generate job {}", id);
        Ok(Accepted {
            location: format!("/generated-circuits/{id}"),
            id,
        })
    }

    /// Poll an execute job's record.
    pub async fn poll(&self, id: &JobId) -> ServiceResult<PollResponse> {
        let record = self
            .store
            .result(id)
            .await?
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))?;

        if record.complete {
            Ok(PollResponse {
                id: record.id,
                complete: true,
                result: record.payload,
                backend: Some(record.backend),
                shots: Some(record.shots),
                post_processing_result: record.post_processing_result,
            })
        } else {
            Ok(PollResponse {
                id: record.id,
                complete: false,
                result: None,
                backend: None,
                shots: None,
                post_processing_result: None,
            })
        }
    }

    /// Poll a generate job's record.
    pub async fn poll_generated(&self, id: &JobId) -> ServiceResult<GeneratedPollResponse> {
        let record = self
            .store
            .generated(id)
            .await?
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))?;

        if record.complete {
            Ok(GeneratedPollResponse {
                id: record.id,
                complete: true,
                language: record
                    .serialization
                    .is_some()
                    .then(|| record.language.label().to_string()),
                generated_circuit: record.serialization,
                stats: record.stats,
                error: record.error,
            })
        } else {
            Ok(GeneratedPollResponse {
                id: record.id,
                complete: false,
                generated_circuit: None,
                language: None,
                stats: None,
                error: None,
            })
        }
    }

    /// Service version string.
    pub fn version(&self) -> &'static str {
        SERVICE_VERSION
    }
}

fn parse_language(label: &str) -> ServiceResult<SourceLanguage> {
    SourceLanguage::from_str(label).map_err(|e| ServiceError::BadRequest(e.to_string()))
}

/// The URL wins when both locator forms are present, matching the original
/// request convention.
fn resolve_locator(url: Option<&str>, data: Option<&str>) -> ServiceResult<ProgramLocator> {
    match (url, data) {
        (Some(url), _) => Ok(ProgramLocator::url(url)),
        (None, Some(data)) => ProgramLocator::from_base64(data)
            .map_err(|e| ServiceError::BadRequest(e.to_string())),
        (None, None) => Err(ServiceError::BadRequest(
            "No implementation specified".to_string(),
        )),
    }
}

/// Adaptation failures surfaced by synchronous operations.
///
/// Unsupported constructs and parse failures are client errors; the rest is
/// unexpected and internal.
fn client_adapt_error(error: AdaptError) -> ServiceError {
    match error {
        AdaptError::Unsupported { .. } | AdaptError::Pipeline(_) => {
            ServiceError::BadRequest(error.to_string())
        }
        other => ServiceError::Internal(other.to_string()),
    }
}
