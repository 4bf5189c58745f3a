//! Withdrawal storage trait.

use custody_types::{Withdrawal, WithdrawalUpdate};

use crate::StoreError;

/// Withdrawal records keyed by `(burn_address, burn_index)`.
pub trait WithdrawalStore {
    /// Insert with zero approved amount and tax. A duplicate key is a
    /// [`StoreError::ConstraintViolation`].
    fn register_withdrawal(&self, burn_address: &str, burn_index: u32) -> Result<(), StoreError>;

    /// More than one row for the key is a [`StoreError::DataIntegrity`] error.
    fn get_withdrawal(
        &self,
        burn_address: &str,
        burn_index: u32,
    ) -> Result<Option<Withdrawal>, StoreError>;

    fn get_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError>;

    /// Withdrawals whose `approvedTax` is exactly the string `"0"`.
    fn get_unapproved_withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError>;

    /// Set approved amount and tax for one key. No matching row is a
    /// [`StoreError::NotFound`] error.
    fn update_withdrawal(&self, update: &WithdrawalUpdate) -> Result<(), StoreError>;
}
