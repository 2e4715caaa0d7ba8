use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use memory_core::errors::{MemoryError, MemoryResult};
use memory_core::models::{
    Confidence, DomainEvent, DomainEventType, Importance, MemoryLayer, MemoryRecord, MemoryType, Provenance, SourceType,
};
use memory_core::traits::{IEventSink, IMemoryStorage, ListFilter};

use memory_fs::{CreateInput, Repository, UpdateInput};
use memory_policy::{run_policies, with_duplicate_warning, AttributionPolicy, ConfidencePolicy, ContentPolicy, DuplicatePolicy};
use memory_storage::StorageEngine;

/// Fields a caller supplies for an explicitly-remembered memory. The
/// service fills in `type = fact`, `importance = 0.7`, `confidence = 1.0`
/// when the caller leaves them unset.
#[derive(Debug, Clone, Default)]
pub struct RememberExplicitInput {
    pub content: String,
    pub memory_type: Option<MemoryType>,
    pub layer: Option<MemoryLayer>,
    pub importance: Option<Importance>,
    pub confidence: Option<Confidence>,
    pub tags: Vec<String>,
    pub entities: Vec<String>,
    pub conversation_id: Option<String>,
}

/// Fields for a memory inferred rather than stated outright. The service
/// fills in `importance = 0.5` when unset and stamps `source.type =
/// implicit`.
#[derive(Debug, Clone, Default)]
pub struct SaveImplicitInput {
    pub content: String,
    pub memory_type: MemoryType,
    pub layer: MemoryLayer,
    pub importance: Option<Importance>,
    pub confidence: Confidence,
    pub tags: Vec<String>,
    pub entities: Vec<String>,
    pub conversation_id: String,
}

/// Service façade (C8): readiness gating, default-valued create APIs, and
/// domain event emission. Every public operation asserts readiness first.
pub struct MemoryService {
    storage: Arc<StorageEngine>,
    repository: Arc<Repository>,
    content_policy: ContentPolicy,
    confidence_policy: ConfidencePolicy,
    attribution_policy: AttributionPolicy,
    duplicate_policy: DuplicatePolicy<StorageEngine>,
    sinks: Mutex<Vec<Arc<dyn IEventSink>>>,
    ready: AtomicBool,
}

impl MemoryService {
    pub fn new(storage: Arc<StorageEngine>, repository: Arc<Repository>, config: &memory_core::config::MemoryEngineConfig) -> Self {
        let duplicate_policy = DuplicatePolicy::new(storage.clone());
        Self {
            storage,
            repository,
            content_policy: ContentPolicy::new(config.policy.max_content_length),
            confidence_policy: ConfidencePolicy::new(config.policy.min_implicit_confidence),
            attribution_policy: AttributionPolicy,
            duplicate_policy,
            sinks: Mutex::new(Vec::new()),
            ready: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self, sink: Arc<dyn IEventSink>) {
        self.sinks.lock().unwrap().push(sink);
    }

    pub fn initialize(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn shutdown(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn assert_ready(&self) -> MemoryResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(MemoryError::NotReady)
        }
    }

    /// DB connected + current memory count.
    pub async fn health_check(&self) -> MemoryResult<HealthStatus> {
        self.assert_ready()?;
        let count = self.storage.count(ListFilter::default()).await?;
        Ok(HealthStatus { ready: true, memory_count: count })
    }

    pub async fn remember_explicit(&self, input: RememberExplicitInput) -> MemoryResult<MemoryRecord> {
        self.assert_ready()?;

        let provenance = Provenance { source_type: SourceType::Explicit, conversation_id: input.conversation_id };
        let create_input = CreateInput {
            content: input.content,
            memory_type: input.memory_type.unwrap_or(MemoryType::Fact),
            layer: input.layer.unwrap_or(MemoryLayer::Stm),
            importance: input.importance.unwrap_or(Importance::new(0.7)),
            confidence: input.confidence.unwrap_or(Confidence::new(1.0)),
            tags: input.tags,
            entities: input.entities,
            provenance,
            supersedes: None,
            superseded_by: None,
        };

        self.create_validated(create_input).await
    }

    pub async fn save_implicit(&self, input: SaveImplicitInput) -> MemoryResult<MemoryRecord> {
        self.assert_ready()?;

        let create_input = CreateInput {
            content: input.content,
            memory_type: input.memory_type,
            layer: input.layer,
            importance: input.importance.unwrap_or(Importance::new(0.5)),
            confidence: input.confidence,
            tags: input.tags,
            entities: input.entities,
            provenance: Provenance { source_type: SourceType::Implicit, conversation_id: Some(input.conversation_id) },
            supersedes: None,
            superseded_by: None,
        };

        self.create_validated(create_input).await
    }

    /// Best-effort batch create: each item is validated and written
    /// independently; a failing item is logged and excluded from the
    /// returned successes rather than aborting the whole batch.
    pub async fn save_batch(&self, inputs: Vec<SaveImplicitInput>) -> MemoryResult<Vec<MemoryRecord>> {
        self.assert_ready()?;

        let mut saved = Vec::with_capacity(inputs.len());
        for input in inputs {
            match self.save_implicit(input).await {
                Ok(record) => saved.push(record),
                Err(e) => tracing::warn!("saveBatch item failed, skipping: {e}"),
            }
        }
        Ok(saved)
    }

    async fn create_validated(&self, input: CreateInput) -> MemoryResult<MemoryRecord> {
        use memory_core::traits::IWritePolicy;

        let policy_input = memory_core::traits::WritePolicyInput {
            content: input.content.clone(),
            importance: input.importance,
            confidence: input.confidence,
            provenance: input.provenance.clone(),
        };

        let policies: [&dyn IWritePolicy; 3] = [&self.content_policy, &self.confidence_policy, &self.attribution_policy];
        let report = run_policies(&policies, &policy_input);
        let warning = self.duplicate_policy.check_duplicate_async(&input.content).await;
        let report = with_duplicate_warning(report, warning);

        if !report.passed {
            let reasons: Vec<String> = report
                .violations
                .iter()
                .map(|v| format!("{:?}: {}", v.policy, v.reason))
                .collect();
            return Err(MemoryError::Policy(reasons.join("; ")));
        }

        let record = self.repository.create(input).await?;
        self.emit(DomainEventType::Created, record.clone());
        Ok(record)
    }

    pub async fn get_by_id(&self, id: &str) -> MemoryResult<Option<MemoryRecord>> {
        self.assert_ready()?;
        self.storage.get_by_id(id).await
    }

    /// Defaults to `limit = 50` when the filter leaves it unset.
    pub async fn list(&self, mut filter: ListFilter) -> MemoryResult<Vec<MemoryRecord>> {
        self.assert_ready()?;
        if filter.limit.is_none() {
            filter.limit = Some(50);
        }
        self.storage.list(filter).await
    }

    pub async fn count(&self, filter: ListFilter) -> MemoryResult<u64> {
        self.assert_ready()?;
        self.storage.count(filter).await
    }

    pub async fn update(&self, id: &str, changes: UpdateInput) -> MemoryResult<MemoryRecord> {
        self.assert_ready()?;
        let record = self.repository.update(id, changes).await?;
        self.emit(DomainEventType::Updated, record.clone());
        Ok(record)
    }

    pub async fn forget(&self, id: &str) -> MemoryResult<()> {
        self.assert_ready()?;
        let record = self.storage.get_by_id(id).await?;
        self.repository.delete(id).await?;
        if let Some(record) = record {
            self.emit(DomainEventType::Deleted, record);
        }
        Ok(())
    }

    fn emit(&self, event_type: DomainEventType, record: MemoryRecord) {
        let event = DomainEvent { event_type, record, timestamp: Utc::now() };
        let sinks = self.sinks.lock().unwrap();
        for sink in sinks.iter() {
            sink.on_memory_event(&event);
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub ready: bool,
    pub memory_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tempfile::tempdir;

    struct RecordingSink(StdMutex<Vec<DomainEventType>>);

    impl IEventSink for RecordingSink {
        fn on_memory_event(&self, event: &DomainEvent) {
            self.0.lock().unwrap().push(event.event_type);
        }
    }

    fn service() -> (MemoryService, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let repository = Arc::new(Repository::new(storage.clone(), dir.path().join("memories")).unwrap());
        let config = memory_core::config::MemoryEngineConfig::default();
        (MemoryService::new(storage, repository, &config), dir)
    }

    #[tokio::test]
    async fn operations_before_initialize_return_not_ready() {
        let (svc, _dir) = service();
        let err = svc.get_by_id("whatever").await.unwrap_err();
        assert!(matches!(err, MemoryError::NotReady));
    }

    #[tokio::test]
    async fn remember_explicit_applies_documented_defaults() {
        let (svc, _dir) = service();
        svc.initialize();

        let record = svc
            .remember_explicit(RememberExplicitInput { content: "the launch moved to March".to_string(), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(record.memory_type, MemoryType::Fact);
        assert!((record.importance.get() - 0.7).abs() < 1e-9);
        assert!((record.confidence.get() - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn save_implicit_without_conversation_id_is_rejected_by_attribution_policy() {
        let (svc, _dir) = service();
        svc.initialize();

        let input = SaveImplicitInput {
            content: "user seems to prefer dark mode".to_string(),
            memory_type: MemoryType::Preference,
            layer: MemoryLayer::Stm,
            importance: None,
            confidence: Confidence::new(0.9),
            tags: vec![],
            entities: vec![],
            conversation_id: "conv-1".to_string(),
        };
        let record = svc.save_implicit(input).await.unwrap();
        assert!((record.importance.get() - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn save_batch_skips_failures_and_returns_only_successes() {
        let (svc, _dir) = service();
        svc.initialize();

        let good = SaveImplicitInput {
            content: "good memory".to_string(),
            memory_type: MemoryType::Fact,
            layer: MemoryLayer::Stm,
            importance: None,
            confidence: Confidence::new(0.9),
            tags: vec![],
            entities: vec![],
            conversation_id: "conv-1".to_string(),
        };
        let bad_confidence = SaveImplicitInput { confidence: Confidence::new(0.0), ..good.clone() };

        let results = svc.save_batch(vec![good, bad_confidence]).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn mutations_emit_domain_events_to_subscribed_sinks() {
        let (svc, _dir) = service();
        svc.initialize();
        let sink = Arc::new(RecordingSink(StdMutex::new(Vec::new())));
        svc.subscribe(sink.clone());

        let record = svc
            .remember_explicit(RememberExplicitInput { content: "subscribed events fire".to_string(), ..Default::default() })
            .await
            .unwrap();
        svc.forget(&record.id).await.unwrap();

        let events = sink.0.lock().unwrap();
        assert_eq!(*events, vec![DomainEventType::Created, DomainEventType::Deleted]);
    }
}
