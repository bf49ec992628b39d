//! Record stores.
//!
//! The store is the only state shared between concurrently running jobs,
//! and each job only ever completes the record keyed by its own id. The
//! exactly-once completion invariant is enforced here: completing an
//! already-complete record is an error, whatever the caller.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::{ServiceError, ServiceResult};
use crate::record::{GeneratedCircuitRecord, GeneratedOutcome, JobId, ResultRecord};

/// Persistence contract for job records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert the empty result record written at submission time.
    async fn insert_result(&self, record: ResultRecord) -> ServiceResult<()>;

    /// Fetch a result record.
    async fn result(&self, id: &JobId) -> ServiceResult<Option<ResultRecord>>;

    /// Move a result record to its terminal state.
    ///
    /// Fails with [`ServiceError::AlreadyComplete`] if the record has
    /// already been completed.
    async fn complete_result(&self, id: &JobId, payload: Value) -> ServiceResult<()>;

    /// Attach a post-processing result to a completed record.
    async fn attach_post_processing(&self, id: &JobId, value: Value) -> ServiceResult<()>;

    /// Insert the empty generated-circuit record written at submission time.
    async fn insert_generated(&self, record: GeneratedCircuitRecord) -> ServiceResult<()>;

    /// Fetch a generated-circuit record.
    async fn generated(&self, id: &JobId) -> ServiceResult<Option<GeneratedCircuitRecord>>;

    /// Move a generated-circuit record to its terminal state.
    async fn complete_generated(&self, id: &JobId, outcome: GeneratedOutcome)
    -> ServiceResult<()>;
}

fn apply_result_completion(record: &mut ResultRecord, payload: Value) -> ServiceResult<()> {
    if record.complete {
        return Err(ServiceError::AlreadyComplete(record.id.clone()));
    }
    record.payload = Some(payload);
    record.complete = true;
    Ok(())
}

fn apply_generated_completion(
    record: &mut GeneratedCircuitRecord,
    outcome: GeneratedOutcome,
) -> ServiceResult<()> {
    if record.complete {
        return Err(ServiceError::AlreadyComplete(record.id.clone()));
    }
    match outcome {
        GeneratedOutcome::Circuit {
            serialization,
            stats,
        } => {
            record.serialization = Some(serialization);
            record.stats = Some(stats);
        }
        GeneratedOutcome::Error(message) => record.error = Some(message),
    }
    record.complete = true;
    Ok(())
}

/// In-memory store for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryStore {
    results: RwLock<FxHashMap<JobId, ResultRecord>>,
    generated: RwLock<FxHashMap<JobId, GeneratedCircuitRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_result(&self, record: ResultRecord) -> ServiceResult<()> {
        self.results.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn result(&self, id: &JobId) -> ServiceResult<Option<ResultRecord>> {
        Ok(self.results.read().await.get(id).cloned())
    }

    async fn complete_result(&self, id: &JobId, payload: Value) -> ServiceResult<()> {
        let mut results = self.results.write().await;
        let record = results
            .get_mut(id)
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))?;
        apply_result_completion(record, payload)
    }

    async fn attach_post_processing(&self, id: &JobId, value: Value) -> ServiceResult<()> {
        let mut results = self.results.write().await;
        let record = results
            .get_mut(id)
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))?;
        record.post_processing_result = Some(value);
        Ok(())
    }

    async fn insert_generated(&self, record: GeneratedCircuitRecord) -> ServiceResult<()> {
        self.generated
            .write()
            .await
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn generated(&self, id: &JobId) -> ServiceResult<Option<GeneratedCircuitRecord>> {
        Ok(self.generated.read().await.get(id).cloned())
    }

    async fn complete_generated(
        &self,
        id: &JobId,
        outcome: GeneratedOutcome,
    ) -> ServiceResult<()> {
        let mut generated = self.generated.write().await;
        let record = generated
            .get_mut(id)
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))?;
        apply_generated_completion(record, outcome)
    }
}

/// JSON file-backed store.
///
/// One file per record under `results/` and `generated/`, with an in-memory
/// cache in front. Suitable for development and single-node deployments,
/// not for anything that needs transactional guarantees.
pub struct JsonStore {
    base_dir: PathBuf,
    results: RwLock<FxHashMap<JobId, ResultRecord>>,
    generated: RwLock<FxHashMap<JobId, GeneratedCircuitRecord>>,
}

impl JsonStore {
    /// Open (or create) a store rooted at the given directory.
    pub async fn new(base_dir: impl AsRef<Path>) -> ServiceResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join("results")).await?;
        fs::create_dir_all(base_dir.join("generated")).await?;

        let store = Self {
            base_dir,
            results: RwLock::new(FxHashMap::default()),
            generated: RwLock::new(FxHashMap::default()),
        };
        store.load_existing().await?;
        Ok(store)
    }

    /// Create a store in a fresh temporary directory.
    pub async fn temp() -> ServiceResult<Self> {
        let dir = std::env::temp_dir().join(format!("skinfaxi-{}", uuid::Uuid::new_v4()));
        Self::new(dir).await
    }

    fn result_path(&self, id: &JobId) -> PathBuf {
        self.base_dir.join("results").join(format!("{id}.json"))
    }

    fn generated_path(&self, id: &JobId) -> PathBuf {
        self.base_dir.join("generated").join(format!("{id}.json"))
    }

    async fn load_existing(&self) -> ServiceResult<()> {
        let mut results = self.results.write().await;
        let mut entries = fs::read_dir(self.base_dir.join("results")).await?;
        while let Some(entry) = entries.next_entry().await? {
            match read_record::<ResultRecord>(&entry.path()).await {
                Ok(Some(record)) => {
                    results.insert(record.id.clone(), record);
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable record {:?}: {}", entry.path(), e),
            }
        }
        drop(results);

        let mut generated = self.generated.write().await;
        let mut entries = fs::read_dir(self.base_dir.join("generated")).await?;
        while let Some(entry) = entries.next_entry().await? {
            match read_record::<GeneratedCircuitRecord>(&entry.path()).await {
                Ok(Some(record)) => {
                    generated.insert(record.id.clone(), record);
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable record {:?}: {}", entry.path(), e),
            }
        }
        Ok(())
    }

    async fn write_result(&self, record: &ResultRecord) -> ServiceResult<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.result_path(&record.id), json).await?;
        Ok(())
    }

    async fn write_generated(&self, record: &GeneratedCircuitRecord) -> ServiceResult<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.generated_path(&record.id), json).await?;
        Ok(())
    }
}

async fn read_record<T: serde::de::DeserializeOwned>(path: &Path) -> ServiceResult<Option<T>> {
    if path.extension().is_none_or(|ext| ext != "json") {
        return Ok(None);
    }
    let content = fs::read_to_string(path).await?;
    Ok(Some(serde_json::from_str(&content)?))
}

#[async_trait]
impl RecordStore for JsonStore {
    async fn insert_result(&self, record: ResultRecord) -> ServiceResult<()> {
        self.write_result(&record).await?;
        self.results.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn result(&self, id: &JobId) -> ServiceResult<Option<ResultRecord>> {
        Ok(self.results.read().await.get(id).cloned())
    }

    async fn complete_result(&self, id: &JobId, payload: Value) -> ServiceResult<()> {
        let mut results = self.results.write().await;
        let record = results
            .get_mut(id)
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))?;
        apply_result_completion(record, payload)?;
        let json = serde_json::to_string_pretty(&*record)?;
        fs::write(self.result_path(id), json).await?;
        Ok(())
    }

    async fn attach_post_processing(&self, id: &JobId, value: Value) -> ServiceResult<()> {
        let mut results = self.results.write().await;
        let record = results
            .get_mut(id)
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))?;
        record.post_processing_result = Some(value);
        let json = serde_json::to_string_pretty(&*record)?;
        fs::write(self.result_path(id), json).await?;
        Ok(())
    }

    async fn insert_generated(&self, record: GeneratedCircuitRecord) -> ServiceResult<()> {
        self.write_generated(&record).await?;
        self.generated
            .write()
            .await
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn generated(&self, id: &JobId) -> ServiceResult<Option<GeneratedCircuitRecord>> {
        Ok(self.generated.read().await.get(id).cloned())
    }

    async fn complete_generated(
        &self,
        id: &JobId,
        outcome: GeneratedOutcome,
    ) -> ServiceResult<()> {
        let mut generated = self.generated.write().await;
        let record = generated
            .get_mut(id)
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))?;
        apply_generated_completion(record, outcome)?;
        let json = serde_json::to_string_pretty(&*record)?;
        fs::write(self.generated_path(id), json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_lifecycle() {
        let store = MemoryStore::new();
        let id = JobId::from("job-1");
        store
            .insert_result(ResultRecord::pending(id.clone(), "dev", 100))
            .await
            .unwrap();

        let record = store.result(&id).await.unwrap().unwrap();
        assert!(!record.complete);

        store
            .complete_result(&id, json!({"counts": {"0": 100}}))
            .await
            .unwrap();
        let record = store.result(&id).await.unwrap().unwrap();
        assert!(record.complete);
        assert_eq!(record.payload.unwrap()["counts"]["0"], 100);
    }

    #[tokio::test]
    async fn test_second_completion_rejected() {
        let store = MemoryStore::new();
        let id = JobId::from("job-1");
        store
            .insert_result(ResultRecord::pending(id.clone(), "dev", 100))
            .await
            .unwrap();

        store
            .complete_result(&id, json!({"counts": {}}))
            .await
            .unwrap();
        let err = store
            .complete_result(&id, json!({"error": "late"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyComplete(_)));
    }

    #[tokio::test]
    async fn test_complete_unknown_record() {
        let store = MemoryStore::new();
        let err = store
            .complete_result(&JobId::from("missing"), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn test_json_store_round_trip() {
        let store = JsonStore::temp().await.unwrap();
        let id = JobId::from("job-json");
        store
            .insert_result(ResultRecord::pending(id.clone(), "dev", 7))
            .await
            .unwrap();
        store
            .complete_result(&id, json!({"counts": {"11": 7}}))
            .await
            .unwrap();

        let record = store.result(&id).await.unwrap().unwrap();
        assert!(record.complete);
        assert_eq!(record.shots, 7);
    }

    #[tokio::test]
    async fn test_json_store_reloads_from_disk() {
        let dir = std::env::temp_dir().join(format!("skinfaxi-reload-{}", uuid::Uuid::new_v4()));
        let id = JobId::from("durable");
        {
            let store = JsonStore::new(&dir).await.unwrap();
            store
                .insert_result(ResultRecord::pending(id.clone(), "dev", 1))
                .await
                .unwrap();
        }
        let store = JsonStore::new(&dir).await.unwrap();
        assert!(store.result(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_generated_lifecycle() {
        let store = MemoryStore::new();
        let id = JobId::from("gen-1");
        store
            .insert_generated(GeneratedCircuitRecord::pending(
                id.clone(),
                skinfaxi_types::TypedParams::new(),
            ))
            .await
            .unwrap();

        store
            .complete_generated(&id, GeneratedOutcome::Error("load failed".into()))
            .await
            .unwrap();

        let record = store.generated(&id).await.unwrap().unwrap();
        assert!(record.complete);
        assert_eq!(record.error.as_deref(), Some("load failed"));
        assert!(record.serialization.is_none());

        let err = store
            .complete_generated(&id, GeneratedOutcome::Error("again".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyComplete(_)));
    }
}
