//! Database schema migration engine.
//!
//! The schema version lives in SQLite's `user_version` pragma. Migrations run
//! sequentially, each in its own transaction, to bring an older database up
//! to date.

use rusqlite::{Connection, Transaction};

use crate::SqliteError;

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS usedDepositAddresses (
    address TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS mintDepositAddresses (
    mintAddress TEXT NOT NULL,
    depositAddress TEXT NOT NULL,
    redeemScript TEXT NOT NULL,
    approvedTax TEXT NOT NULL DEFAULT '0'
);
CREATE TABLE IF NOT EXISTS withdrawals (
    burnAddress TEXT NOT NULL,
    burnIndex INTEGER NOT NULL,
    approvedAmount TEXT NOT NULL DEFAULT '0',
    approvedTax TEXT NOT NULL DEFAULT '0'
);
";

const SCHEMA_V2: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS usedDepositAddresses_address
    ON usedDepositAddresses (address);
CREATE UNIQUE INDEX IF NOT EXISTS mintDepositAddresses_mintAddress
    ON mintDepositAddresses (mintAddress);
CREATE UNIQUE INDEX IF NOT EXISTS mintDepositAddresses_depositAddress
    ON mintDepositAddresses (depositAddress);
CREATE UNIQUE INDEX IF NOT EXISTS withdrawals_burnAddress_burnIndex
    ON withdrawals (burnAddress, burnIndex);
";

/// Keys that v2 makes unique: `(table, key columns)`.
const UNIQUE_KEYS: &[(&str, &str)] = &[
    ("usedDepositAddresses", "address"),
    ("mintDepositAddresses", "mintAddress"),
    ("mintDepositAddresses", "depositAddress"),
    ("withdrawals", "burnAddress || '#' || burnIndex"),
];

/// Runs database migrations to bring the schema up to date.
pub struct Migrator;

impl Migrator {
    /// Check the stored schema version and run any needed migrations.
    ///
    /// - Version 0 means a fresh database or a file created before versioning.
    /// - If the stored version matches `CURRENT_SCHEMA_VERSION`, this is a no-op.
    /// - A version *higher* than this code supports is refused.
    /// - A legacy database with duplicate keys stays at v1. It is logged at
    ///   `error` level and retried on the next open; until then the affected
    ///   lookups report `DataIntegrity`.
    pub fn run(conn: &mut Connection) -> Result<(), SqliteError> {
        let current = schema_version(conn)?;

        if current == CURRENT_SCHEMA_VERSION {
            tracing::debug!(version = current, "database schema is up to date");
            return Ok(());
        }

        if current > CURRENT_SCHEMA_VERSION {
            return Err(SqliteError::SchemaTooNew {
                found: current,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        for version in current..CURRENT_SCHEMA_VERSION {
            tracing::info!(from = version, to = version + 1, "running migration");
            let tx = conn.transaction()?;
            match run_migration(&tx, version, version + 1) {
                Ok(()) => {}
                Err(SqliteError::Duplicate { table, key }) => {
                    tracing::error!(
                        table,
                        key = %key,
                        version,
                        "duplicate rows block unique indexes, staying at current schema"
                    );
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
            tx.pragma_update(None, "user_version", version + 1)?;
            tx.commit()?;
        }

        tracing::info!(version = CURRENT_SCHEMA_VERSION, "migration complete");
        Ok(())
    }
}

pub(crate) fn schema_version(conn: &Connection) -> Result<u32, SqliteError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

fn run_migration(tx: &Transaction<'_>, from: u32, to: u32) -> Result<(), SqliteError> {
    match (from, to) {
        (0, 1) => {
            tx.execute_batch(SCHEMA_V1)?;
            Ok(())
        }
        (1, 2) => {
            for &(table, key) in UNIQUE_KEYS {
                if let Some(duplicate) = find_duplicate(tx, table, key)? {
                    return Err(SqliteError::Duplicate {
                        table,
                        key: duplicate,
                    });
                }
            }
            tx.execute_batch(SCHEMA_V2)?;
            Ok(())
        }
        _ => Err(SqliteError::UnknownMigration { from, to }),
    }
}

fn find_duplicate(tx: &Transaction<'_>, table: &str, key: &str) -> Result<Option<String>, SqliteError> {
    let sql = format!(
        "SELECT CAST({key} AS TEXT) FROM {table} GROUP BY {key} HAVING COUNT(*) > 1 LIMIT 1"
    );
    let mut stmt = tx.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}
