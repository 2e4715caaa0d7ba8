//! # memory-fs
//!
//! Filesystem half of the memory engine: the Markdown frontmatter codec
//! (C1/C2), the dual-write repository (C4), the ingestor (C5), the
//! debounced watcher (C6), and the file-sync lifecycle wrapper (C12).

pub mod codec;
pub mod file_sync;
pub mod ingestor;
pub mod repository;
pub mod watcher;

pub use file_sync::FileSyncService;
pub use ingestor::Ingestor;
pub use repository::{CreateInput, Repository, UpdateInput};
pub use watcher::MemoryWatcher;
