//! Mint-address to deposit-address binding storage trait.

use custody_types::{MintDepositAddress, MintDepositAddressUpdate};

use crate::StoreError;

/// Bindings from mint-chain addresses to deposit addresses.
pub trait MintDepositAddressStore {
    /// Insert a binding with `approvedTax = "0"`.
    fn register_mint_deposit_address(
        &self,
        mint_address: &str,
        deposit_address: &str,
        redeem_script: &str,
    ) -> Result<(), StoreError>;

    /// The deposit address bound to `mint_address`, if any.
    ///
    /// More than one binding is a [`StoreError::DataIntegrity`] error.
    fn get_mint_deposit_address(&self, mint_address: &str) -> Result<Option<String>, StoreError>;

    /// All bindings, or only those whose deposit address is in `filter`.
    fn get_mint_deposit_addresses(
        &self,
        filter: Option<&[String]>,
    ) -> Result<Vec<MintDepositAddress>, StoreError>;

    /// Set `approvedTax` on the binding for `update.deposit_address`.
    ///
    /// Mint address and redeem script are never touched. No matching row is
    /// a [`StoreError::NotFound`] error.
    fn update_mint_deposit_address(&self, update: &MintDepositAddressUpdate)
        -> Result<(), StoreError>;
}
