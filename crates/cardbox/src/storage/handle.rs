//! Lazily-initialized shared handle to the card store.
//!
//! The store connection is a single process-wide resource: the first caller
//! opens (or creates) the database, applies migrations, and caches the
//! handle; every later caller gets the same handle back. Concurrent
//! first-time callers are serialized by the init cell, so the store is
//! never opened twice. This layer never closes the handle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{Connection, ErrorCode};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::migrations;

/// Path used for transient in-memory stores (tests).
const IN_MEMORY_PATH: &str = ":memory:";

/// How long a caller waits for another holder of the store to yield before
/// a busy error is surfaced.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Shared handle to the underlying store connection.
///
/// Clones are cheap; all clones serialize access through the same lock,
/// which is what gives read-modify-write operations their atomicity.
pub type SharedHandle = Arc<Mutex<Connection>>;

/// Owner of the lazily-created store handle.
#[derive(Debug)]
pub struct HandleManager {
    path: PathBuf,
    busy_timeout: Duration,
    handle: OnceCell<SharedHandle>,
}

impl HandleManager {
    /// Create a manager for the store at `path`. No I/O happens until the
    /// first [`handle`](Self::handle) call.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            handle: OnceCell::new(),
        }
    }

    /// Create a manager backed by a transient in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_PATH)
    }

    /// Override the busy timeout used when the store is held elsewhere.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Get the path of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the shared handle, opening the store on first use.
    ///
    /// Idempotent: the first call opens or creates the database, creates
    /// parent directories, and applies migrations; later calls return the
    /// cached handle without re-opening. A failed open is not retried here;
    /// the next call attempts the open again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatabaseOpen`] if the store cannot be opened and
    /// propagates migration and directory-creation failures.
    pub async fn handle(&self) -> Result<SharedHandle> {
        let handle = self.handle.get_or_try_init(|| async { self.open() }).await?;
        Ok(Arc::clone(handle))
    }

    fn open(&self) -> Result<SharedHandle> {
        let in_memory = self.path.as_os_str() == IN_MEMORY_PATH;

        if !in_memory {
            if let Some(parent) = self.path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
            }
        }

        debug!("Opening card store at {}", self.path.display());
        let conn = match Connection::open(&self.path) {
            Ok(conn) => conn,
            Err(source) => {
                if is_busy(&source) {
                    // Another holder (e.g. a second process) has the store
                    // open with an incompatible lock. Advisory, not fatal to
                    // the process: the caller decides whether to try again.
                    warn!(
                        "card store at {} is held by another process",
                        self.path.display()
                    );
                }
                return Err(Error::DatabaseOpen {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        conn.busy_timeout(self.busy_timeout)?;

        if !in_memory {
            // WAL mode for better concurrent read behavior.
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        }

        migrations::initialize_schema(&conn)?;

        info!("card store opened at {}", self.path.display());
        Ok(Arc::new(Mutex::new(conn)))
    }
}

/// Check whether a sqlite error is a busy/locked condition.
fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}
