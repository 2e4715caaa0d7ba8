//! Dual-write repository (C4): keeps a SQLite row and a Markdown file in
//! lockstep for every memory. The observable contract is that after any
//! public method returns successfully, either both row and file exist, or
//! neither does.
//!
//! Atomicity choice (see `DESIGN.md`): write the DB row (plus its
//! provenance entry) first inside its own transaction, then write the
//! file outside that transaction. If the file write fails, issue a
//! compensating DELETE (create) or a compensating restore-update (update)
//! and surface the original error. No cross-engine distributed
//! transaction required.

mod inputs;

pub use inputs::{CreateInput, UpdateInput};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use memory_core::errors::{MemoryError, MemoryResult};
use memory_core::models::{MemoryFileRecord, MemoryRecord, ReconciliationReport};
use memory_storage::{queries, StorageEngine};

use crate::codec;

pub struct Repository {
    storage: Arc<StorageEngine>,
    data_dir: PathBuf,
}

impl Repository {
    pub fn new(storage: Arc<StorageEngine>, data_dir: impl Into<PathBuf>) -> MemoryResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { storage, data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Deterministic `<sanitized-id>.md` path for a memory id. Any
    /// character outside `[A-Za-z0-9_-]` is replaced with `_`.
    pub fn file_path_for(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.md", sanitize_id(id)))
    }

    pub fn quarantine_dir(&self) -> PathBuf {
        self.data_dir.join(".quarantine")
    }

    pub async fn create(&self, input: CreateInput) -> MemoryResult<MemoryRecord> {
        self.create_with_id(new_id(), input).await
    }

    /// Like `create`, but keeps the caller-supplied id instead of minting
    /// a fresh one. Used by the ingestor so a record created from a file
    /// stays addressable by the id that file already carried.
    pub async fn create_preserving_id(&self, id: &str, input: CreateInput) -> MemoryResult<MemoryRecord> {
        self.create_with_id(id.to_string(), input).await
    }

    async fn create_with_id(&self, id: String, input: CreateInput) -> MemoryResult<MemoryRecord> {
        if !input.layer.is_persisted() {
            return Err(MemoryError::Validation(format!(
                "layer {:?} is never persisted to the store",
                input.layer.as_str()
            )));
        }

        let now = Utc::now();

        let record = MemoryRecord {
            id,
            content: input.content.trim().to_string(),
            memory_type: input.memory_type,
            layer: input.layer,
            importance: input.importance,
            confidence: input.confidence,
            tags: input.tags,
            entities: input.entities,
            provenance: input.provenance,
            supersedes: input.supersedes,
            superseded_by: input.superseded_by,
            embedding: None,
            created_at: now,
            updated_at: now,
            accessed_at: now,
        };

        self.write_row_and_provenance(&record, "created", serde_json::json!({}))?;

        let path = self.file_path_for(&record.id);
        let markdown = codec::serialize(&to_file_record(&record, None));
        if let Err(write_err) = std::fs::write(&path, markdown) {
            // Compensating DELETE: the row must not outlive its file.
            let _ = self.storage.with_writer(|conn| queries::memory_crud::delete_memory(conn, &record.id));
            return Err(MemoryError::Io(write_err));
        }

        Ok(record)
    }

    pub async fn update(&self, id: &str, changes: UpdateInput) -> MemoryResult<MemoryRecord> {
        use memory_core::traits::IMemoryStorage;
        let existing = self.storage.get_by_id(id).await?.ok_or_else(|| MemoryError::NotFound { id: id.to_string() })?;

        let mut updated = existing.clone();
        let now = Utc::now();
        if let Some(content) = changes.content {
            updated.content = content.trim().to_string();
        }
        if let Some(importance) = changes.importance {
            updated.importance = importance;
        }
        if let Some(confidence) = changes.confidence {
            updated.confidence = confidence;
        }
        if let Some(tags) = changes.tags {
            updated.tags = tags;
        }
        if let Some(entities) = changes.entities {
            updated.entities = entities;
        }
        if let Some(supersedes) = changes.supersedes {
            updated.supersedes = supersedes;
        }
        if let Some(superseded_by) = changes.superseded_by {
            updated.superseded_by = superseded_by;
        }
        updated.updated_at = now;
        updated.accessed_at = now;

        let checksum = blake3::hash(updated.content.as_bytes()).to_hex().to_string();
        self.storage.with_writer(|conn| {
            conn.execute_batch("BEGIN IMMEDIATE").map_err(|e| MemoryError::Db(e.to_string()))?;
            let result: MemoryResult<()> = (|| {
                queries::memory_crud::update_memory(conn, &updated)?;
                queries::provenance_ops::insert_provenance(conn, &updated.id, "updated", &serde_json::json!({ "checksum": checksum }))?;
                Ok(())
            })();
            match result {
                Ok(()) => conn.execute_batch("COMMIT").map_err(|e| MemoryError::Db(e.to_string())),
                Err(e) => {
                    let _ = conn.execute_batch("ROLLBACK");
                    Err(e)
                }
            }
        })?;

        let path = self.file_path_for(&updated.id);
        let markdown = codec::serialize(&to_file_record(&updated, None));
        if let Err(write_err) = std::fs::write(&path, markdown) {
            // Compensating restore: put the original row back.
            let _ = self.storage.with_writer(|conn| queries::memory_crud::update_memory(conn, &existing));
            return Err(MemoryError::Io(write_err));
        }

        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> MemoryResult<()> {
        let path = self.file_path_for(id);

        self.storage.with_writer(|conn| {
            conn.execute_batch("BEGIN IMMEDIATE").map_err(|e| MemoryError::Db(e.to_string()))?;
            let result: MemoryResult<()> = (|| {
                if queries::memory_crud::get_memory(conn, id)?.is_none() {
                    return Err(MemoryError::NotFound { id: id.to_string() });
                }
                // Record the deletion event while the row still exists, then
                // remove it. `memory_provenance` carries no foreign key on
                // `memory_id` (see v003_provenance), so this row and every
                // earlier provenance row for `id` survive the delete as a
                // standing audit trail.
                queries::provenance_ops::insert_provenance(conn, id, "deleted", &serde_json::json!({}))?;
                queries::memory_crud::delete_memory(conn, id)?;
                Ok(())
            })();
            match result {
                Ok(()) => conn.execute_batch("COMMIT").map_err(|e| MemoryError::Db(e.to_string())),
                Err(e) => {
                    let _ = conn.execute_batch("ROLLBACK");
                    Err(e)
                }
            }
        })?;

        // Tolerate an already-missing file: the net state is still
        // consistent, and a pre-deleted file is an intentional policy,
        // not an error.
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MemoryError::Io(e)),
        }
    }

    /// Read-only audit: compares every DB row against every `.md` file
    /// under the data directory (excluding the quarantine subdirectory).
    /// Never repairs anything it finds.
    pub fn reconcile(&self) -> MemoryResult<ReconciliationReport> {
        let rows = self.storage.all_ids_and_content()?;
        let row_by_id: std::collections::HashMap<String, String> = rows.into_iter().collect();

        let quarantine = self.quarantine_dir();
        let mut file_content_by_id = std::collections::HashMap::new();
        let mut orphaned_files = Vec::new();

        if self.data_dir.is_dir() {
            for entry in std::fs::read_dir(&self.data_dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.starts_with(&quarantine) || !path.is_file() {
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("md") {
                    continue;
                }
                let text = std::fs::read_to_string(&path)?;
                match codec::parse(&text) {
                    Ok(record) => {
                        file_content_by_id.insert(record.id.clone(), record.content.clone());
                        if !row_by_id.contains_key(&record.id) {
                            orphaned_files.push(file_name(&path));
                        }
                    }
                    Err(_) => orphaned_files.push(file_name(&path)),
                }
            }
        }

        let mut missing_files = Vec::new();
        let mut content_mismatches = Vec::new();

        for (id, row_content) in &row_by_id {
            match file_content_by_id.get(id) {
                None => missing_files.push(id.clone()),
                Some(file_content) if file_content != row_content => content_mismatches.push(id.clone()),
                Some(_) => {}
            }
        }

        missing_files.sort();
        content_mismatches.sort();
        orphaned_files.sort();

        Ok(ReconciliationReport { orphaned_files, missing_files, content_mismatches })
    }

    fn write_row_and_provenance(&self, record: &MemoryRecord, event: &str, details: serde_json::Value) -> MemoryResult<()> {
        self.storage.with_writer(|conn| {
            conn.execute_batch("BEGIN IMMEDIATE").map_err(|e| MemoryError::Db(e.to_string()))?;
            let result: MemoryResult<()> = (|| {
                queries::memory_crud::insert_memory(conn, record)?;
                queries::provenance_ops::insert_provenance(conn, &record.id, event, &details)?;
                Ok(())
            })();
            match result {
                Ok(()) => conn.execute_batch("COMMIT").map_err(|e| MemoryError::Db(e.to_string())),
                Err(e) => {
                    let _ = conn.execute_batch("ROLLBACK");
                    Err(e)
                }
            }
        })
    }
}

fn sanitize_id(id: &str) -> String {
    id.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' }).collect()
}

fn file_name(path: &Path) -> String {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string()
}

fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Converts the in-memory record to its on-disk shape. `message_id`
/// carries through only for callers that track one (document ingestion).
pub fn to_file_record(record: &MemoryRecord, message_id: Option<String>) -> MemoryFileRecord {
    MemoryFileRecord {
        id: record.id.clone(),
        version: memory_core::models::FILE_FORMAT_VERSION,
        memory_type: record.memory_type,
        layer: record.layer,
        importance: record.importance,
        confidence: record.confidence,
        tags: record.tags.clone(),
        entities: record.entities.clone(),
        source: memory_core::models::FileSource {
            source_type: record.provenance.source_type,
            conversation_id: record.provenance.conversation_id.clone(),
            message_id,
        },
        supersedes: record.supersedes.clone(),
        superseded_by: record.superseded_by.clone(),
        created_at: record.created_at,
        updated_at: record.updated_at,
        accessed_at: record.accessed_at,
        content: record.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_core::models::{Confidence, Importance, MemoryLayer, MemoryType, Provenance, SourceType};
    use tempfile::tempdir;

    fn repo() -> (Repository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let repo = Repository::new(storage, dir.path().join("memories")).unwrap();
        (repo, dir)
    }

    fn create_input(content: &str) -> CreateInput {
        CreateInput {
            content: content.to_string(),
            memory_type: MemoryType::Fact,
            layer: MemoryLayer::Stm,
            importance: Importance::new(0.7),
            confidence: Confidence::new(1.0),
            tags: vec![],
            entities: vec![],
            provenance: Provenance { source_type: SourceType::Explicit, conversation_id: None },
            supersedes: None,
            superseded_by: None,
        }
    }

    #[tokio::test]
    async fn create_produces_matching_row_and_file() {
        let (repo, _dir) = repo();
        let record = repo.create(create_input("hello world")).await.unwrap();
        let path = repo.file_path_for(&record.id);
        assert!(path.exists());
        let report = repo.reconcile().unwrap();
        assert!(report.is_consistent());
    }

    #[tokio::test]
    async fn delete_removes_both_row_and_file() {
        let (repo, _dir) = repo();
        let record = repo.create(create_input("to be deleted")).await.unwrap();
        let path = repo.file_path_for(&record.id);
        repo.delete(&record.id).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn reconcile_detects_tamper_and_orphans() {
        let (repo, _dir) = repo();
        let a = repo.create(create_input("memory A")).await.unwrap();
        let b = repo.create(create_input("memory B")).await.unwrap();

        // Tamper A's body while keeping its frontmatter valid.
        let a_path = repo.file_path_for(&a.id);
        let original = std::fs::read_to_string(&a_path).unwrap();
        let tampered = original.replace("memory A", "TAMPERED");
        std::fs::write(&a_path, tampered).unwrap();

        std::fs::remove_file(repo.file_path_for(&b.id)).unwrap();

        let orphan_path = repo.data_dir().join("orphan-X.md");
        let orphan_text = codec::serialize(&to_file_record(
            &MemoryRecord {
                id: "orphan-X".to_string(),
                content: "orphaned".to_string(),
                memory_type: MemoryType::Fact,
                layer: MemoryLayer::Stm,
                importance: Importance::new(0.5),
                confidence: Confidence::new(1.0),
                tags: vec![],
                entities: vec![],
                provenance: Provenance { source_type: SourceType::Explicit, conversation_id: None },
                supersedes: None,
                superseded_by: None,
                embedding: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                accessed_at: Utc::now(),
            },
            None,
        ));
        std::fs::write(&orphan_path, orphan_text).unwrap();

        let report = repo.reconcile().unwrap();
        assert!(!report.is_consistent());
        assert_eq!(report.content_mismatches, vec![a.id.clone()]);
        assert_eq!(report.missing_files, vec![b.id.clone()]);
        assert_eq!(report.orphaned_files, vec!["orphan-X.md".to_string()]);
    }

    #[test]
    fn sanitizes_ids_for_file_names() {
        assert_eq!(sanitize_id("abc/def:123"), "abc_def_123");
    }

    #[tokio::test]
    async fn working_layer_is_never_persisted() {
        let (repo, _dir) = repo();
        let input = CreateInput { layer: MemoryLayer::Working, ..create_input("transient") };
        let err = repo.create(input).await.unwrap_err();
        assert!(matches!(err, MemoryError::Validation(_)));
        assert_eq!(repo.reconcile().unwrap().is_consistent(), true);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn create_rolls_back_the_row_when_the_file_write_fails() {
        use std::os::unix::fs::PermissionsExt;

        let (repo, _dir) = repo();
        let readonly = std::fs::Permissions::from_mode(0o500);
        std::fs::set_permissions(repo.data_dir(), readonly).unwrap();

        let result = repo.create(create_input("never lands on disk")).await;
        assert!(result.is_err());

        // restore so the tempdir can be cleaned up
        std::fs::set_permissions(repo.data_dir(), std::fs::Permissions::from_mode(0o700)).unwrap();

        let report = repo.reconcile().unwrap();
        assert!(report.is_consistent(), "compensating delete must leave no orphaned row: {report:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn update_restores_the_original_row_when_the_file_write_fails() {
        use std::os::unix::fs::PermissionsExt;

        let (repo, _dir) = repo();
        let record = repo.create(create_input("original content")).await.unwrap();

        let readonly = std::fs::Permissions::from_mode(0o500);
        std::fs::set_permissions(repo.data_dir(), readonly).unwrap();

        let changes = UpdateInput {
            content: Some("attempted change".to_string()),
            importance: None,
            confidence: None,
            tags: None,
            entities: None,
            supersedes: None,
            superseded_by: None,
        };
        let result = repo.update(&record.id, changes).await;
        assert!(result.is_err());

        std::fs::set_permissions(repo.data_dir(), std::fs::Permissions::from_mode(0o700)).unwrap();

        use memory_core::traits::IMemoryStorage;
        let current = repo.storage.get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(current.content, "original content");
    }
}
