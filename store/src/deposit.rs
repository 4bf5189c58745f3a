//! Used deposit-address storage trait.

use crate::StoreError;

/// Addresses that have been issued for deposits. Entries are permanent.
pub trait UsedDepositAddressStore {
    /// True iff at least one of `addresses` is already used.
    ///
    /// An empty input is never used.
    fn has_used_deposit_addresses(&self, addresses: &[String]) -> Result<bool, StoreError>;

    /// Insert one address. Re-inserting an existing address is a
    /// [`StoreError::ConstraintViolation`].
    fn register_used_deposit_address(&self, address: &str) -> Result<(), StoreError>;

    fn used_deposit_address_count(&self) -> Result<u64, StoreError>;
}
