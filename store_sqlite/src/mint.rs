//! SQLite implementation of MintDepositAddressStore.

use rusqlite::{params, params_from_iter, Row};

use custody_store::{MintDepositAddressStore, StoreError};
use custody_types::{DecimalAmount, MintDepositAddress, MintDepositAddressUpdate};

use crate::deposit::placeholders;
use crate::{SqliteError, SqliteLedgerStore};

const SELECT_BINDINGS: &str =
    "SELECT mintAddress, depositAddress, redeemScript, approvedTax FROM mintDepositAddresses";

fn row_to_binding(row: &Row<'_>) -> rusqlite::Result<MintDepositAddress> {
    Ok(MintDepositAddress {
        mint_address: row.get(0)?,
        deposit_address: row.get(1)?,
        redeem_script: row.get(2)?,
        approved_tax: DecimalAmount::from_stored(row.get::<_, String>(3)?),
    })
}

impl MintDepositAddressStore for SqliteLedgerStore {
    fn register_mint_deposit_address(
        &self,
        mint_address: &str,
        deposit_address: &str,
        redeem_script: &str,
    ) -> Result<(), StoreError> {
        let inserted = self
            .conn()
            .execute(
                "INSERT INTO mintDepositAddresses (mintAddress, depositAddress, redeemScript, approvedTax)
                 SELECT ?1, ?2, ?3, ?4
                 WHERE NOT EXISTS (
                     SELECT 1 FROM mintDepositAddresses WHERE mintAddress = ?1 OR depositAddress = ?2
                 )",
                params![
                    mint_address,
                    deposit_address,
                    redeem_script,
                    DecimalAmount::ZERO_STR
                ],
            )
            .map_err(SqliteError::from)?;
        if inserted == 0 {
            return Err(StoreError::ConstraintViolation(format!(
                "mint address {mint_address} or deposit address {deposit_address} already bound"
            )));
        }
        tracing::debug!(mint_address, deposit_address, "registered mint deposit address");
        Ok(())
    }

    fn get_mint_deposit_address(&self, mint_address: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached("SELECT depositAddress FROM mintDepositAddresses WHERE mintAddress = ?1")
            .map_err(SqliteError::from)?;
        let mut found = stmt
            .query_map([mint_address], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(SqliteError::from)?;
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            n => Err(StoreError::DataIntegrity(format!(
                "mint address {mint_address} has {n} deposit address bindings"
            ))),
        }
    }

    fn get_mint_deposit_addresses(
        &self,
        filter: Option<&[String]>,
    ) -> Result<Vec<MintDepositAddress>, StoreError> {
        let conn = self.conn();
        let bindings = match filter {
            Some([]) => Vec::new(),
            Some(deposit_addresses) => {
                let sql = format!(
                    "{SELECT_BINDINGS} WHERE depositAddress IN ({}) ORDER BY rowid",
                    placeholders(deposit_addresses.len())
                );
                let mut stmt = conn.prepare(&sql).map_err(SqliteError::from)?;
                let rows = stmt
                    .query_map(params_from_iter(deposit_addresses.iter()), row_to_binding)
                    .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
                    .map_err(SqliteError::from)?;
                rows
            }
            None => {
                let mut stmt = conn
                    .prepare_cached(&format!("{SELECT_BINDINGS} ORDER BY rowid"))
                    .map_err(SqliteError::from)?;
                let rows = stmt
                    .query_map([], row_to_binding)
                    .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
                    .map_err(SqliteError::from)?;
                rows
            }
        };
        Ok(bindings)
    }

    fn update_mint_deposit_address(
        &self,
        update: &MintDepositAddressUpdate,
    ) -> Result<(), StoreError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE mintDepositAddresses SET approvedTax = ?1 WHERE depositAddress = ?2",
                params![update.approved_tax.as_str(), update.deposit_address],
            )
            .map_err(SqliteError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!(
                "mint binding for deposit address {}",
                update.deposit_address
            )));
        }
        tracing::debug!(
            deposit_address = %update.deposit_address,
            approved_tax = %update.approved_tax,
            "updated mint deposit address"
        );
        Ok(())
    }
}
