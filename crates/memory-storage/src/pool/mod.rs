//! Connection management: a single writer connection plus a pool of
//! read-only connections, all sharing one WAL-mode database file.

mod pragmas;

pub use pragmas::verify_wal_mode;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

/// Serializes every mutating operation behind one connection, per the
/// single-writer concurrency model: SQLite permits many readers under WAL
/// but only one writer at a time.
pub struct Writer {
    conn: Mutex<Connection>,
}

impl Writer {
    /// Runs `f` with exclusive access to the writer connection.
    pub fn with_conn_sync<T>(&self, f: impl FnOnce(&Connection) -> MemoryResult<T>) -> MemoryResult<T> {
        let conn = self.conn.lock().expect("writer connection mutex poisoned");
        f(&conn)
    }
}

/// Where a fallback connection (opened when the pool runs dry) should come
/// from: a real file path, or the shared-cache in-memory URI every
/// connection in an `open_in_memory()` engine is opened against.
enum ConnSource {
    File(String),
    SharedMemory(String),
}

/// A small pool of read-only connections for concurrent queries (search,
/// list, count) that never contend with the single writer.
pub struct ReaderPool {
    conns: Mutex<Vec<Connection>>,
    source: ConnSource,
}

impl ReaderPool {
    fn new(db_path: &str, size: usize, busy_timeout_ms: u64) -> MemoryResult<Self> {
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            conns.push(open_connection(db_path, busy_timeout_ms)?);
        }
        Ok(Self { conns: Mutex::new(conns), source: ConnSource::File(db_path.to_string()) })
    }

    /// Every connection (writer and every reader) is opened against the
    /// same `cache=shared` in-memory URI, so reads actually observe what
    /// the writer committed instead of a fresh, empty private database.
    fn new_shared_memory(uri: &str, size: usize, busy_timeout_ms: u64) -> MemoryResult<Self> {
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            conns.push(open_shared_memory_connection(uri, busy_timeout_ms)?);
        }
        Ok(Self { conns: Mutex::new(conns), source: ConnSource::SharedMemory(uri.to_string()) })
    }

    pub fn with_conn_sync<T>(&self, f: impl FnOnce(&Connection) -> MemoryResult<T>) -> MemoryResult<T> {
        let mut pool = self.conns.lock().expect("reader pool mutex poisoned");
        let conn = match pool.pop() {
            Some(c) => c,
            None => match &self.source {
                ConnSource::File(path) => open_connection(path, 1_000)?,
                ConnSource::SharedMemory(uri) => open_shared_memory_connection(uri, 1_000)?,
            },
        };
        let result = f(&conn);
        pool.push(conn);
        result
    }
}

/// Owns both the writer and the reader pool for one database file.
pub struct ConnectionPool {
    pub writer: Writer,
    pub readers: ReaderPool,
}

impl ConnectionPool {
    pub fn open(db_path: &str, busy_timeout_ms: u64, reader_count: usize) -> MemoryResult<Self> {
        let writer_conn = open_connection(db_path, busy_timeout_ms)?;
        let writer = Writer { conn: Mutex::new(writer_conn) };
        let readers = ReaderPool::new(db_path, reader_count, busy_timeout_ms)?;
        Ok(Self { writer, readers })
    }

    /// Opens a database that lives only for the life of this pool. Every
    /// connection — the writer and every reader — is opened against the
    /// same process-unique `cache=shared` in-memory URI rather than a bare
    /// `:memory:` path, since two `:memory:` connections are otherwise
    /// distinct, private databases: without the shared URI, reads from the
    /// reader pool would silently see an empty database.
    pub fn open_in_memory() -> MemoryResult<Self> {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:memdb_{id}?mode=memory&cache=shared");

        let writer_conn = open_shared_memory_connection(&uri, 1_000)?;
        let writer = Writer { conn: Mutex::new(writer_conn) };
        // At least one reader connection must stay open for the lifetime
        // of the pool: a shared-cache in-memory database is torn down the
        // moment its last connection closes.
        let readers = ReaderPool::new_shared_memory(&uri, 2, 1_000)?;
        Ok(Self { writer, readers })
    }
}

fn open_connection(db_path: &str, busy_timeout_ms: u64) -> MemoryResult<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path).map_err(|e| to_storage_err(e.to_string()))?;
    pragmas::apply(&conn, busy_timeout_ms).map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn)
}

fn open_shared_memory_connection(uri: &str, busy_timeout_ms: u64) -> MemoryResult<Connection> {
    use rusqlite::OpenFlags;
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(uri, flags).map_err(|e| to_storage_err(e.to_string()))?;
    pragmas::apply(&conn, busy_timeout_ms).map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn)
}

/// Drops and recreates the `memory_fts` sync triggers. Safe to call on
/// every engine open: the underlying `memories` rows and the FTS index
/// itself are untouched, only the trigger definitions are replaced.
pub fn ensure_fts_triggers(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch(
        "DROP TRIGGER IF EXISTS memory_fts_ai;
         DROP TRIGGER IF EXISTS memory_fts_ad;
         DROP TRIGGER IF EXISTS memory_fts_au;

         CREATE TRIGGER memory_fts_ai AFTER INSERT ON memories BEGIN
             INSERT INTO memory_fts(rowid, content) VALUES (new.rowid, new.content);
         END;

         CREATE TRIGGER memory_fts_ad AFTER DELETE ON memories BEGIN
             INSERT INTO memory_fts(memory_fts, rowid, content) VALUES ('delete', old.rowid, old.content);
         END;

         CREATE TRIGGER memory_fts_au AFTER UPDATE ON memories BEGIN
             INSERT INTO memory_fts(memory_fts, rowid, content) VALUES ('delete', old.rowid, old.content);
             INSERT INTO memory_fts(rowid, content) VALUES (new.rowid, new.content);
         END;",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(())
}
