//! # memory-storage
//!
//! SQLite persistence layer for the memory engine (C3). Owns the schema,
//! migrations, FTS5 sync triggers, and the prepared queries consumed by
//! `memory-fs`'s dual-write repository and `memory-retrieval`'s retrievers.
//!
//! A single writer connection serializes every mutation; a small pool of
//! read-only connections serves concurrent search/list/count calls. Both
//! share one WAL-mode database file.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use memory_core::errors::MemoryError;

/// Wraps a raw SQLite error string into `MemoryError::Db`. Every query
/// module funnels its `rusqlite::Error`s through this so callers only
/// ever see the engine's own error taxonomy.
pub fn to_storage_err(msg: String) -> MemoryError {
    MemoryError::Db(msg)
}
