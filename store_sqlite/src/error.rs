use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    #[error("unknown migration: {from} -> {to}")]
    UnknownMigration { from: u32, to: u32 },

    #[error("duplicate {key} in table {table}")]
    Duplicate { table: &'static str, key: String },

    #[error("sqlite3 command failed: {0}")]
    Command(String),
}

impl From<SqliteError> for custody_store::StoreError {
    fn from(e: SqliteError) -> Self {
        use custody_store::StoreError;
        let message = e.to_string();
        match e {
            SqliteError::Sqlite(rusqlite::Error::SqliteFailure(err, detail))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::ConstraintViolation(detail.unwrap_or(message))
            }
            SqliteError::Duplicate { .. } => StoreError::DataIntegrity(message),
            SqliteError::SchemaTooNew { .. } | SqliteError::UnknownMigration { .. } => {
                StoreError::Migration(message)
            }
            _ => StoreError::Backend(message),
        }
    }
}
