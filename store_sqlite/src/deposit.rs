//! SQLite implementation of UsedDepositAddressStore.

use rusqlite::params_from_iter;

use custody_store::{StoreError, UsedDepositAddressStore};

use crate::{SqliteError, SqliteLedgerStore};

/// `?, ?, ?` for an `IN (...)` list of `n` values.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl UsedDepositAddressStore for SqliteLedgerStore {
    fn has_used_deposit_addresses(&self, addresses: &[String]) -> Result<bool, StoreError> {
        if addresses.is_empty() {
            return Ok(false);
        }
        let sql = format!(
            "SELECT COUNT(*) FROM usedDepositAddresses WHERE address IN ({})",
            placeholders(addresses.len())
        );
        let count: i64 = self
            .conn()
            .query_row(&sql, params_from_iter(addresses.iter()), |row| row.get(0))
            .map_err(SqliteError::from)?;
        Ok(count > 0)
    }

    fn register_used_deposit_address(&self, address: &str) -> Result<(), StoreError> {
        let inserted = self
            .conn()
            .prepare_cached(
                "INSERT INTO usedDepositAddresses (address) SELECT ?1
                 WHERE NOT EXISTS (SELECT 1 FROM usedDepositAddresses WHERE address = ?1)",
            )
            .and_then(|mut stmt| stmt.execute([address]))
            .map_err(SqliteError::from)?;
        if inserted == 0 {
            return Err(StoreError::ConstraintViolation(format!(
                "deposit address {address} already used"
            )));
        }
        tracing::debug!(address, "registered used deposit address");
        Ok(())
    }

    fn used_deposit_address_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM usedDepositAddresses", [], |row| {
                row.get(0)
            })
            .map_err(SqliteError::from)?;
        Ok(count as u64)
    }
}
