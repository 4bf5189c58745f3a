//! SQLite implementation of WithdrawalStore.

use rusqlite::{params, Row};

use custody_store::{StoreError, WithdrawalStore};
use custody_types::{DecimalAmount, Withdrawal, WithdrawalUpdate};

use crate::{SqliteError, SqliteLedgerStore};

const SELECT_WITHDRAWALS: &str =
    "SELECT burnAddress, burnIndex, approvedAmount, approvedTax FROM withdrawals";

fn row_to_withdrawal(row: &Row<'_>) -> rusqlite::Result<Withdrawal> {
    Ok(Withdrawal {
        burn_address: row.get(0)?,
        burn_index: row.get(1)?,
        approved_amount: DecimalAmount::from_stored(row.get::<_, String>(2)?),
        approved_tax: DecimalAmount::from_stored(row.get::<_, String>(3)?),
    })
}

impl SqliteLedgerStore {
    fn query_withdrawals(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Withdrawal>, SqliteError> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params, row_to_withdrawal)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl WithdrawalStore for SqliteLedgerStore {
    fn register_withdrawal(&self, burn_address: &str, burn_index: u32) -> Result<(), StoreError> {
        let inserted = self
            .conn()
            .execute(
                "INSERT INTO withdrawals (burnAddress, burnIndex, approvedAmount, approvedTax)
                 SELECT ?1, ?2, ?3, ?3
                 WHERE NOT EXISTS (
                     SELECT 1 FROM withdrawals WHERE burnAddress = ?1 AND burnIndex = ?2
                 )",
                params![burn_address, burn_index, DecimalAmount::ZERO_STR],
            )
            .map_err(SqliteError::from)?;
        if inserted == 0 {
            return Err(StoreError::ConstraintViolation(format!(
                "withdrawal {burn_address}#{burn_index} already registered"
            )));
        }
        tracing::debug!(burn_address, burn_index, "registered withdrawal");
        Ok(())
    }

    fn get_withdrawal(
        &self,
        burn_address: &str,
        burn_index: u32,
    ) -> Result<Option<Withdrawal>, StoreError> {
        let mut found = self.query_withdrawals(
            &format!("{SELECT_WITHDRAWALS} WHERE burnAddress = ?1 AND burnIndex = ?2"),
            params![burn_address, burn_index],
        )?;
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            n => Err(StoreError::DataIntegrity(format!(
                "withdrawal {burn_address}#{burn_index} duplicated {n} times"
            ))),
        }
    }

    fn get_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
        Ok(self.query_withdrawals(&format!("{SELECT_WITHDRAWALS} ORDER BY rowid"), [])?)
    }

    fn get_unapproved_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
        Ok(self.query_withdrawals(
            &format!("{SELECT_WITHDRAWALS} WHERE approvedTax = ?1 ORDER BY rowid"),
            [DecimalAmount::ZERO_STR],
        )?)
    }

    fn update_withdrawal(&self, update: &WithdrawalUpdate) -> Result<(), StoreError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE withdrawals SET approvedAmount = ?1, approvedTax = ?2
                 WHERE burnAddress = ?3 AND burnIndex = ?4",
                params![
                    update.approved_amount.as_str(),
                    update.approved_tax.as_str(),
                    update.burn_address,
                    update.burn_index
                ],
            )
            .map_err(SqliteError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("withdrawal {}", update.key())));
        }
        tracing::debug!(
            withdrawal = %update.key(),
            approved_amount = %update.approved_amount,
            approved_tax = %update.approved_tax,
            "updated withdrawal"
        );
        Ok(())
    }
}
