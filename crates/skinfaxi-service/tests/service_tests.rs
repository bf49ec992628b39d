//! End-to-end tests of the job pipeline against the simulator adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use skinfaxi_adapter_sim::SimProvider;
use skinfaxi_hal::ProviderRegistry;
use skinfaxi_pipeline::{HttpLoader, LoadError, LoadedProgram, ProgramLoader};
use skinfaxi_service::{
    AnalyzeRequest, ExecuteRequest, GenerateRequest, JobId, MemoryQueue, MemoryStore, RecordStore,
    Service, ServiceConfig, TranspileOutcome, TranspileRequest, Worker,
};
use skinfaxi_types::{ProgramLocator, SourceLanguage, TypedParams};

const BELL_QASM: &str = r#"
OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
h q[0];
cx q[0], q[1];
measure q -> c;
"#;

fn base64(text: &str) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(text)
}

struct Harness {
    service: Service,
    worker: Worker,
    queue: Arc<MemoryQueue>,
    store: Arc<MemoryStore>,
}

fn harness_with_loader(loader: Arc<dyn ProgramLoader>) -> Harness {
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(SimProvider::new()));
    let registry = Arc::new(registry);

    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(MemoryQueue::new());

    let service = Service::new(
        registry.clone(),
        store.clone(),
        queue.clone(),
        loader.clone(),
        ServiceConfig::default(),
    );
    let worker = Worker::new(registry, store.clone(), loader);

    Harness {
        service,
        worker,
        queue,
        store,
    }
}

fn harness() -> Harness {
    harness_with_loader(Arc::new(HttpLoader::new()))
}

#[tokio::test]
async fn test_analyze_single_hadamard() {
    let h = harness();
    let response = h
        .service
        .analyze(AnalyzeRequest {
            impl_language: "openqasm".into(),
            impl_url: None,
            impl_data: Some(base64("OPENQASM 2.0; qreg q[1]; h q[0];")),
            bearer_token: None,
        })
        .await
        .unwrap();

    assert_eq!(response.original.width, 1);
    assert_eq!(response.original.depth, 1);
    assert_eq!(response.original.number_of_multi_qubit_gates, 0);
    assert_eq!(response.original.number_of_measurement_operations, 0);
    assert_eq!(response.original.number_of_single_qubit_gates, 1);
}

#[tokio::test]
async fn test_transpile_bell_for_simulator() {
    let h = harness();
    let outcome = h
        .service
        .transpile(TranspileRequest {
            provider: "sim".into(),
            qpu_name: "statevector_simulator".into(),
            impl_language: "openqasm".into(),
            impl_url: None,
            impl_data: Some(base64(BELL_QASM)),
            input_params: json!({}),
            bearer_token: None,
        })
        .await
        .unwrap();

    let TranspileOutcome::Transpiled(response) = outcome else {
        panic!("expected successful transpile");
    };
    assert_eq!(response.language, "OpenQASM");
    assert!(response.transpiled_qasm.as_deref().unwrap().contains("cx"));
    // No-op fixed point: before/after statistics agree.
    assert_eq!(response.width, response.original.width);
    assert_eq!(response.number_of_gates, 4);
}

#[tokio::test]
async fn test_transpile_qubit_overflow_is_soft() {
    // 25 qubits against the 20-qubit simulator.
    let wide: String = {
        let mut qasm = String::from("OPENQASM 2.0; qreg q[25]; ");
        for i in 0..25 {
            qasm.push_str(&format!("h q[{i}]; "));
        }
        qasm
    };

    let h = harness();
    let outcome = h
        .service
        .transpile(TranspileRequest {
            provider: "sim".into(),
            qpu_name: "statevector_simulator".into(),
            impl_language: "openqasm".into(),
            impl_url: None,
            impl_data: Some(base64(&wide)),
            input_params: json!({}),
            bearer_token: None,
        })
        .await
        .unwrap();

    let TranspileOutcome::TooManyQubits { error } = outcome else {
        panic!("expected the soft qubit-overflow outcome");
    };
    assert_eq!(error, "too many qubits required");
}

#[tokio::test]
async fn test_transpile_unknown_device_is_not_found() {
    let h = harness();
    let outcome = h
        .service
        .transpile(TranspileRequest {
            provider: "sim".into(),
            qpu_name: "ibmq_tokyo".into(),
            impl_language: "openqasm".into(),
            impl_url: None,
            impl_data: Some(base64(BELL_QASM)),
            input_params: json!({}),
            bearer_token: None,
        })
        .await
        .unwrap();
    assert!(matches!(outcome, TranspileOutcome::TargetNotFound));
}

#[tokio::test]
async fn test_execute_job_lifecycle() {
    let h = harness();
    let accepted = h
        .service
        .execute(ExecuteRequest {
            provider: "sim".into(),
            qpu_name: "statevector_simulator".into(),
            impl_language: Some("openqasm".into()),
            impl_url: None,
            impl_data: Some(base64(BELL_QASM)),
            transpiled_qasm: None,
            transpiled_quil: None,
            input_params: json!({}),
            shots: Some(256),
            bearer_token: None,
            correlation_id: None,
        })
        .await
        .unwrap();

    assert_eq!(accepted.location, format!("/results/{}", accepted.id));

    // Not complete until a worker runs it.
    let pending = h.service.poll(&accepted.id).await.unwrap();
    assert!(!pending.complete);
    assert!(pending.result.is_none());

    assert_eq!(h.worker.drain(h.queue.as_ref()).await.unwrap(), 1);

    let done = h.service.poll(&accepted.id).await.unwrap();
    assert!(done.complete);
    assert_eq!(done.backend.as_deref(), Some("statevector_simulator"));
    assert_eq!(done.shots, Some(256));

    let counts = &done.result.unwrap()["counts"];
    let total = counts["00"].as_u64().unwrap_or(0) + counts["11"].as_u64().unwrap_or(0);
    assert_eq!(total, 256);
}

#[tokio::test]
async fn test_execute_transpiled_qasm_path() {
    let h = harness();
    let accepted = h
        .service
        .execute(ExecuteRequest {
            provider: "sim".into(),
            qpu_name: "statevector_simulator".into(),
            impl_language: None,
            impl_url: None,
            impl_data: None,
            transpiled_qasm: Some(BELL_QASM.into()),
            transpiled_quil: None,
            input_params: json!({}),
            shots: Some(64),
            bearer_token: None,
            correlation_id: None,
        })
        .await
        .unwrap();

    h.worker.drain(h.queue.as_ref()).await.unwrap();
    let done = h.service.poll(&accepted.id).await.unwrap();
    assert!(done.complete);
    assert!(done.result.unwrap().get("counts").is_some());
}

#[tokio::test]
async fn test_execute_transpiled_quil_with_layout_repair() {
    // Physical qubit indices as a Rigetti round trip would leave them;
    // parsing declares 18 qubits, the repair pass compacts to 2.
    let quil = "DECLARE ro BIT[2]\nH 12\nCNOT 12 17\nMEASURE 12 ro[0]\nMEASURE 17 ro[1]\n";

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(SimProvider::with_max_qubits(5)));
    let registry = Arc::new(registry);
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(MemoryQueue::new());
    let loader: Arc<dyn ProgramLoader> = Arc::new(HttpLoader::new());
    let service = Service::new(
        registry.clone(),
        store.clone(),
        queue.clone(),
        loader.clone(),
        ServiceConfig::default(),
    );
    let worker = Worker::new(registry, store, loader);

    let accepted = service
        .execute(ExecuteRequest {
            provider: "sim".into(),
            qpu_name: "statevector_simulator".into(),
            impl_language: None,
            impl_url: None,
            impl_data: None,
            transpiled_qasm: None,
            transpiled_quil: Some(quil.into()),
            input_params: json!({}),
            shots: Some(128),
            bearer_token: None,
            correlation_id: None,
        })
        .await
        .unwrap();

    worker.drain(queue.as_ref()).await.unwrap();
    let done = service.poll(&accepted.id).await.unwrap();
    assert!(done.complete);

    let counts = &done.result.unwrap()["counts"];
    let correlated = counts["00"].as_u64().unwrap_or(0) + counts["11"].as_u64().unwrap_or(0);
    assert_eq!(correlated, 128);
}

#[tokio::test]
async fn test_failed_job_still_completes() {
    let h = harness();
    let accepted = h
        .service
        .execute(ExecuteRequest {
            provider: "ionq".into(), // not registered
            qpu_name: "harmony".into(),
            impl_language: Some("openqasm".into()),
            impl_url: None,
            impl_data: Some(base64(BELL_QASM)),
            transpiled_qasm: None,
            transpiled_quil: None,
            input_params: json!({}),
            shots: None,
            bearer_token: None,
            correlation_id: None,
        })
        .await
        .unwrap();

    h.worker.drain(h.queue.as_ref()).await.unwrap();
    let done = h.service.poll(&accepted.id).await.unwrap();
    assert!(done.complete);
    assert!(done.result.unwrap().get("error").is_some());
}

/// Loader that parses inline text and implements post-processing by echoing
/// the parameters it was handed, the way a sandboxed loader would re-invoke
/// the implementation's entry point.
struct EchoLoader {
    inner: HttpLoader,
}

#[async_trait]
impl ProgramLoader for EchoLoader {
    async fn load(
        &self,
        locator: &ProgramLocator,
        language: SourceLanguage,
        params: &TypedParams,
        bearer_token: Option<&str>,
    ) -> Result<LoadedProgram, LoadError> {
        self.inner.load(locator, language, params, bearer_token).await
    }

    async fn post_process(
        &self,
        _locator: &ProgramLocator,
        _language: SourceLanguage,
        params: &TypedParams,
        _bearer_token: Option<&str>,
    ) -> Result<serde_json::Value, LoadError> {
        let counts = params
            .get_str("counts")
            .ok_or_else(|| LoadError::PostProcessing("counts parameter missing".into()))?;
        let threshold = params.get_str("threshold").unwrap_or("none").to_string();
        Ok(json!({ "counts": counts, "threshold": threshold }))
    }
}

#[tokio::test]
async fn test_generate_then_execute_with_correlation() {
    let h = harness_with_loader(Arc::new(EchoLoader {
        inner: HttpLoader::new(),
    }));

    // Generate: canonicalize and persist the circuit with its parameters.
    let generated = h
        .service
        .generate(GenerateRequest {
            impl_language: "openqasm".into(),
            impl_url: None,
            impl_data: Some(base64(BELL_QASM)),
            input_params: json!({
                "threshold": { "rawValue": "0.5", "type": "String" }
            }),
            bearer_token: None,
        })
        .await
        .unwrap();

    h.worker.drain(h.queue.as_ref()).await.unwrap();

    let gen_poll = h.service.poll_generated(&generated.id).await.unwrap();
    assert!(gen_poll.complete);
    assert!(gen_poll.error.is_none());
    assert!(gen_poll.generated_circuit.unwrap().contains("cx"));
    assert_eq!(gen_poll.stats.unwrap().width, 2);
    assert_eq!(gen_poll.language.as_deref(), Some("OpenQASM"));

    // Execute with the correlation id; post-processing must see the counts
    // merged into the original generation parameters.
    let accepted = h
        .service
        .execute(ExecuteRequest {
            provider: "sim".into(),
            qpu_name: "statevector_simulator".into(),
            impl_language: Some("openqasm".into()),
            impl_url: None,
            impl_data: Some(base64(BELL_QASM)),
            transpiled_qasm: None,
            transpiled_quil: None,
            input_params: json!({}),
            shots: Some(32),
            bearer_token: None,
            correlation_id: Some(generated.id.0.clone()),
        })
        .await
        .unwrap();

    h.worker.drain(h.queue.as_ref()).await.unwrap();

    let done = h.service.poll(&accepted.id).await.unwrap();
    assert!(done.complete);

    let post = done.post_processing_result.expect("post-processing ran");
    assert_eq!(post["threshold"], "0.5");
    assert!(post["counts"].as_str().unwrap().contains('"'));

    let record = h.store.result(&accepted.id).await.unwrap().unwrap();
    assert_eq!(record.generated_circuit_id, Some(generated.id));
}

#[tokio::test]
async fn test_generate_failure_completes_record() {
    let h = harness();
    let generated = h
        .service
        .generate(GenerateRequest {
            impl_language: "openqasm".into(),
            impl_url: None,
            impl_data: Some(base64("OPENQASM 2.0; qreg q[")),
            input_params: json!({}),
            bearer_token: None,
        })
        .await
        .unwrap();

    h.worker.drain(h.queue.as_ref()).await.unwrap();

    let poll = h.service.poll_generated(&generated.id).await.unwrap();
    assert!(poll.complete);
    assert!(poll.error.is_some());
    assert!(poll.generated_circuit.is_none());
}

#[tokio::test]
async fn test_poll_unknown_id() {
    let h = harness();
    assert!(h.service.poll(&JobId::from("missing")).await.is_err());
}

#[tokio::test]
async fn test_version() {
    let h = harness();
    assert_eq!(h.service.version(), "1.0");
}
