//! SQLite database handle.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OpenFlags};

use crate::{Migrator, SqliteError};

/// The primary ledger store, backed by one SQLite file.
///
/// A single connection is shared behind a mutex. Statements are short and
/// never held across an await point by callers.
pub struct SqliteLedgerStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteLedgerStore {
    /// Open or create the database at `path` and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self, SqliteError> {
        let mut conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Migrator::run(&mut conn)?;
        tracing::info!(path = %path.display(), "opened primary ledger store");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// A private in-memory database, for tests and dry runs.
    pub fn in_memory() -> Result<Self, SqliteError> {
        let mut conn = Connection::open_in_memory()?;
        Migrator::run(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Path of the backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves no partial state in SQLite.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<(), SqliteError> {
        let conn = self.conn.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| SqliteError::from(e))
    }
}
