//! Ingestor (C5): turns one on-disk file into a create/update/skip/quarantine
//! decision, and aggregates a full directory scan into a `ScanReport`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use memory_core::errors::MemoryResult;
use memory_core::models::{IngestOutcome, MemoryRecord, ScanReport};

use memory_storage::StorageEngine;

use crate::codec;
use crate::repository::{CreateInput, Repository, UpdateInput};

pub struct Ingestor {
    repository: Arc<Repository>,
    storage: Arc<StorageEngine>,
}

impl Ingestor {
    pub fn new(repository: Arc<Repository>, storage: Arc<StorageEngine>) -> Self {
        Self { repository, storage }
    }

    /// Per-file state machine: `Parsing → (Valid → Lookup → {Create|Update|
    /// Skip}) | (Invalid → Quarantine)`.
    pub async fn ingest_file(&self, path: &Path) -> MemoryResult<IngestOutcome> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => return Ok(IngestOutcome::quarantined(format!("unreadable file: {e}"))),
        };

        let parsed = match codec::parse(&text) {
            Ok(record) => record,
            Err(e) => {
                let reason = e.to_string();
                self.quarantine(path, &reason)?;
                return Ok(IngestOutcome::quarantined(reason));
            }
        };

        use memory_core::traits::IMemoryStorage;
        let existing = self.storage.get_by_id(&parsed.id).await?;

        match existing {
            None => {
                let input = CreateInput {
                    content: parsed.content.clone(),
                    memory_type: parsed.memory_type,
                    layer: parsed.layer,
                    importance: parsed.importance,
                    confidence: parsed.confidence,
                    tags: parsed.tags.clone(),
                    entities: parsed.entities.clone(),
                    provenance: memory_core::models::Provenance {
                        source_type: parsed.source.source_type,
                        conversation_id: parsed.source.conversation_id.clone(),
                    },
                    supersedes: parsed.supersedes.clone(),
                    superseded_by: parsed.superseded_by.clone(),
                };
                // Ingested files keep their own id rather than a freshly
                // minted one, so the record stays addressable by the name
                // the file was already sanitized from.
                let record = self.repository.create_preserving_id(&parsed.id, input).await?;
                Ok(IngestOutcome::created(record.id))
            }
            Some(current) => {
                if records_equivalent(&current, &parsed) {
                    Ok(IngestOutcome::skipped(current.id))
                } else {
                    let changes = UpdateInput {
                        content: Some(parsed.content.clone()),
                        importance: Some(parsed.importance),
                        confidence: Some(parsed.confidence),
                        tags: Some(parsed.tags.clone()),
                        entities: Some(parsed.entities.clone()),
                        supersedes: Some(parsed.supersedes.clone()),
                        superseded_by: Some(parsed.superseded_by.clone()),
                    };
                    let record = self.repository.update(&current.id, changes).await?;
                    Ok(IngestOutcome::updated(record.id))
                }
            }
        }
    }

    /// Scans every `.md` entry in the data directory (non-regular files
    /// are skipped; a non-existent directory yields an empty report).
    pub async fn scan_directory(&self) -> MemoryResult<ScanReport> {
        let mut report = ScanReport::default();
        let dir = self.repository.data_dir();
        if !dir.is_dir() {
            return Ok(report);
        }

        let quarantine = self.repository.quarantine_dir();
        let mut entries: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.starts_with(&quarantine) {
                continue;
            }
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            entries.push(path);
        }

        report.total_files = entries.len();

        for path in entries {
            match self.ingest_file(&path).await {
                Ok(outcome) => match outcome.action {
                    memory_core::models::IngestAction::Created => report.ingested += 1,
                    memory_core::models::IngestAction::Updated => report.updated += 1,
                    memory_core::models::IngestAction::Skipped => report.skipped += 1,
                    memory_core::models::IngestAction::Quarantined => report.quarantined += 1,
                },
                Err(e) => report.errors.push(e.to_string()),
            }
        }

        Ok(report)
    }

    fn quarantine(&self, path: &Path, reason: &str) -> MemoryResult<()> {
        let quarantine_dir = self.repository.quarantine_dir();
        std::fs::create_dir_all(&quarantine_dir)?;

        let file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        let dest = quarantine_dir.join(&file_name);
        std::fs::rename(path, &dest)?;

        let error_path = {
            let mut p = dest.clone().into_os_string();
            p.push(".error");
            PathBuf::from(p)
        };
        let body = format!("quarantined at {}\nreason: {reason}\n", Utc::now().to_rfc3339());
        std::fs::write(error_path, body)?;

        Ok(())
    }

}

/// Order-insensitive content/metadata comparison used to decide whether a
/// re-parsed file actually changed from what's stored.
fn records_equivalent(current: &MemoryRecord, parsed: &memory_core::models::MemoryFileRecord) -> bool {
    current.content == parsed.content
        && (current.importance.get() - parsed.importance.get()).abs() < f64::EPSILON
        && (current.confidence.get() - parsed.confidence.get()).abs() < f64::EPSILON
        && MemoryRecord::tags_equivalent(&current.tags, &parsed.tags)
        && MemoryRecord::entities_equivalent(&current.entities, &parsed.entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_storage::StorageEngine;
    use tempfile::tempdir;

    fn ingestor() -> (Ingestor, Arc<Repository>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let repo = Arc::new(Repository::new(storage.clone(), dir.path().join("memories")).unwrap());
        (Ingestor::new(repo.clone(), storage), repo, dir)
    }

    fn write_fixture(repo: &Repository, id: &str, content: &str) -> PathBuf {
        use chrono::Utc;
        use memory_core::models::{Confidence, FileSource, Importance, MemoryFileRecord, MemoryLayer, MemoryType, SourceType};
        let now = Utc::now();
        let record = MemoryFileRecord {
            id: id.to_string(),
            version: 1,
            memory_type: MemoryType::Fact,
            layer: MemoryLayer::Stm,
            importance: Importance::new(0.6),
            confidence: Confidence::new(1.0),
            tags: vec![],
            entities: vec![],
            source: FileSource { source_type: SourceType::Explicit, conversation_id: None, message_id: None },
            supersedes: None,
            superseded_by: None,
            created_at: now,
            updated_at: now,
            accessed_at: now,
            content: content.to_string(),
        };
        let path = repo.file_path_for(id);
        std::fs::write(&path, codec::serialize(&record)).unwrap();
        path
    }

    #[tokio::test]
    async fn new_file_is_created() {
        let (ingestor, repo, _dir) = ingestor();
        let path = write_fixture(&repo, "file-1", "first content");
        let outcome = ingestor.ingest_file(&path).await.unwrap();
        assert_eq!(outcome.action, memory_core::models::IngestAction::Created);
    }

    #[tokio::test]
    async fn unchanged_file_is_skipped() {
        let (ingestor, repo, _dir) = ingestor();
        let path = write_fixture(&repo, "file-2", "stable content");
        ingestor.ingest_file(&path).await.unwrap();
        let outcome = ingestor.ingest_file(&path).await.unwrap();
        assert_eq!(outcome.action, memory_core::models::IngestAction::Skipped);
    }

    #[tokio::test]
    async fn modified_file_is_updated() {
        let (ingestor, repo, _dir) = ingestor();
        let path = write_fixture(&repo, "file-3", "original");
        ingestor.ingest_file(&path).await.unwrap();
        write_fixture(&repo, "file-3", "changed");
        let outcome = ingestor.ingest_file(&path).await.unwrap();
        assert_eq!(outcome.action, memory_core::models::IngestAction::Updated);
    }

    #[tokio::test]
    async fn malformed_file_is_quarantined() {
        let (ingestor, repo, _dir) = ingestor();
        let path = repo.file_path_for("bad");
        std::fs::write(&path, "---\ninvalid: yaml: content\n---\n\nbody\n").unwrap();
        let outcome = ingestor.ingest_file(&path).await.unwrap();
        assert_eq!(outcome.action, memory_core::models::IngestAction::Quarantined);
        assert!(!path.exists());
        assert!(repo.quarantine_dir().join("bad.md").exists());
        assert!(repo.quarantine_dir().join("bad.md.error").exists());
    }
}
