//! Filesystem watcher (C6): debounced directory notifications feeding the
//! ingestor. Single-threaded cooperative at the component level — one
//! event loop task receives OS notifications and schedules per-file
//! debounce timers; a single file never has two ingests in flight because
//! a new event on the same name cancels and replaces its pending timer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tracing::{debug, warn};

use memory_core::config::WatcherConfig;
use memory_core::errors::{MemoryError, MemoryResult};

use crate::ingestor::Ingestor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Debounced directory watcher. `start`/`stop` follow
/// `Stopped ↔ Starting → Running → Stopping → Stopped`; both are
/// idempotent no-ops when already in their target state.
pub struct MemoryWatcher {
    ingestor: Arc<Ingestor>,
    data_dir: PathBuf,
    config: WatcherConfig,
    state: Mutex<State>,
    pending: Mutex<HashMap<String, tokio::task::JoinHandle<()>>>,
    os_watcher: Mutex<Option<RecommendedWatcher>>,
}

impl MemoryWatcher {
    pub fn new(ingestor: Arc<Ingestor>, data_dir: impl Into<PathBuf>, config: WatcherConfig) -> Arc<Self> {
        Arc::new(Self {
            ingestor,
            data_dir: data_dir.into(),
            config,
            state: Mutex::new(State::Stopped),
            pending: Mutex::new(HashMap::new()),
            os_watcher: Mutex::new(None),
        })
    }

    pub fn is_running(&self) -> bool {
        *self.state.lock().unwrap() == State::Running
    }

    /// Idempotent: a `start()` while already `Running`/`Starting` is a
    /// no-op. Verifies the directory exists and is a directory first.
    pub async fn start(self: &Arc<Self>) -> MemoryResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            if matches!(*state, State::Running | State::Starting) {
                return Ok(());
            }
            *state = State::Starting;
        }

        if !self.data_dir.is_dir() {
            *self.state.lock().unwrap() = State::Stopped;
            return Err(MemoryError::Validation(format!("{} is not a directory", self.data_dir.display())));
        }

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Event>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => warn!("watcher subscription error: {e}"),
        })
        .map_err(|e| MemoryError::Io(std::io::Error::other(e.to_string())))?;

        watcher
            .watch(&self.data_dir, RecursiveMode::NonRecursive)
            .map_err(|e| MemoryError::Io(std::io::Error::other(e.to_string())))?;

        *self.os_watcher.lock().unwrap() = Some(watcher);
        *self.state.lock().unwrap() = State::Running;

        let this = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if !this.is_running() {
                    break;
                }
                this.handle_event(event);
            }
        });

        Ok(())
    }

    /// Cancels every pending debounce timer before releasing the OS
    /// watcher handle. Idempotent when already `Stopped`.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if *state == State::Stopped {
                return;
            }
            *state = State::Stopping;
        }

        let mut pending = self.pending.lock().unwrap();
        for (_, handle) in pending.drain() {
            handle.abort();
        }
        drop(pending);

        *self.os_watcher.lock().unwrap() = None;
        *self.state.lock().unwrap() = State::Stopped;
    }

    /// Delegates to the ingestor's directory scan; independent of live
    /// watching and safe to call concurrently with it.
    pub async fn rescan(&self) -> MemoryResult<memory_core::models::ScanReport> {
        self.ingestor.scan_directory().await
    }

    fn handle_event(self: &Arc<Self>, event: Event) {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
            return;
        }

        for path in event.paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            if !self.should_consider(name) {
                continue;
            }
            self.schedule_debounced(name.to_string(), path.clone());
        }
    }

    fn should_consider(&self, name: &str) -> bool {
        if name.starts_with('.') || name.starts_with('~') || name.starts_with('#') {
            return false;
        }
        let stem_is_md = name.ends_with(".md");
        if self.config.ignored_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())) {
            return false;
        }
        stem_is_md
    }

    fn schedule_debounced(self: &Arc<Self>, name: String, path: PathBuf) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(old) = pending.remove(&name) {
            old.abort();
        }

        let this = Arc::clone(self);
        let debounce = std::time::Duration::from_millis(self.config.debounce_ms);
        let key = name.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            this.fire(&key, &path).await;
        });
        pending.insert(name, handle);
    }

    async fn fire(self: &Arc<Self>, name: &str, path: &Path) {
        self.pending.lock().unwrap().remove(name);

        if !path.exists() {
            debug!("watched file removed: {}", path.display());
            return;
        }
        if !path.is_file() {
            return;
        }

        match self.ingestor.ingest_file(path).await {
            Ok(outcome) => debug!("watcher ingest {}: {:?}", path.display(), outcome.action),
            Err(e) => warn!("watcher ingest failed for {}: {e}", path.display()),
        }
    }
}

impl Drop for MemoryWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
