//! File-sync service (C12): the lifecycle wrapper that binds a watcher to
//! an ingestor and exposes the combination as one start/stop/rescan unit
//! for the service façade to hold.

use std::path::PathBuf;
use std::sync::Arc;

use memory_core::config::WatcherConfig;
use memory_core::errors::MemoryResult;
use memory_core::models::ScanReport;

use memory_storage::StorageEngine;

use crate::ingestor::Ingestor;
use crate::repository::Repository;
use crate::watcher::MemoryWatcher;

/// Owns the ingestor and watcher for one data directory. `start()` runs an
/// initial full scan before arming the live watcher, so a cold boot picks
/// up anything written while the process was down before it starts
/// reacting to new events.
pub struct FileSyncService {
    repository: Arc<Repository>,
    ingestor: Arc<Ingestor>,
    watcher: Arc<MemoryWatcher>,
}

impl FileSyncService {
    pub fn new(storage: Arc<StorageEngine>, data_dir: impl Into<PathBuf>, config: WatcherConfig) -> MemoryResult<Self> {
        let data_dir = data_dir.into();
        let repository = Arc::new(Repository::new(storage.clone(), data_dir.clone())?);
        let ingestor = Arc::new(Ingestor::new(repository.clone(), storage));
        let watcher = MemoryWatcher::new(ingestor.clone(), data_dir, config);
        Ok(Self { repository, ingestor, watcher })
    }

    pub fn repository(&self) -> Arc<Repository> {
        self.repository.clone()
    }

    /// Runs a full directory scan, then arms the live watcher. Returns the
    /// scan report so callers can surface quarantine counts on boot.
    pub async fn start(&self) -> MemoryResult<ScanReport> {
        let report = self.ingestor.scan_directory().await?;
        self.watcher.start().await?;
        Ok(report)
    }

    pub fn stop(&self) {
        self.watcher.stop();
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_running()
    }

    /// Manual rescan, safe to call while the watcher is live — it only
    /// ever reconciles state that an in-flight debounce timer would also
    /// reach, so a race just means the same file gets ingested twice in a
    /// row and the second pass is a no-op skip.
    pub async fn rescan(&self) -> MemoryResult<ScanReport> {
        self.ingestor.scan_directory().await
    }

    pub fn reconcile(&self) -> MemoryResult<memory_core::models::ReconciliationReport> {
        self.repository.reconcile()
    }
}

impl Drop for FileSyncService {
    fn drop(&mut self) {
        self.watcher.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn start_picks_up_preexisting_files_then_runs() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("memories");
        std::fs::create_dir_all(&data_dir).unwrap();

        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let service = FileSyncService::new(storage, data_dir.clone(), WatcherConfig::default()).unwrap();

        let record = crate::codec::parse(
            "---\nid: preexisting\nversion: 1\ntype: fact\nlayer: stm\nimportance: 0.5\nconfidence: 1.0\ntags: []\nentities: []\nsource:\n  type: explicit\ncreatedAt: 2026-01-01T00:00:00Z\nupdatedAt: 2026-01-01T00:00:00Z\naccessedAt: 2026-01-01T00:00:00Z\n---\n\nbody text\n",
        )
        .unwrap();
        std::fs::write(data_dir.join("preexisting.md"), crate::codec::serialize(&record)).unwrap();

        let report = service.start().await.unwrap();
        assert_eq!(report.ingested, 1);
        assert!(service.is_running());

        service.stop();
        assert!(!service.is_running());
    }
}
