//! Abstract primary-store traits for the custodial bridge ledger.
//!
//! The primary store is authoritative: every read is served from it and every
//! mutation commits to it before anything is mirrored to the audit store.
//! Backends implement these traits; the ledger service depends only on the
//! traits. Every write here touches a single record. Batches are sequenced
//! by the ledger service so each element is mirrored as it commits.

pub mod deposit;
pub mod error;
pub mod mint;
pub mod withdrawal;

pub use deposit::UsedDepositAddressStore;
pub use error::StoreError;
pub use mint::MintDepositAddressStore;
pub use withdrawal::WithdrawalStore;

/// The full primary ledger: all three record families in one backend.
pub trait LedgerStore: UsedDepositAddressStore + MintDepositAddressStore + WithdrawalStore {}

impl<T> LedgerStore for T where T: UsedDepositAddressStore + MintDepositAddressStore + WithdrawalStore {}
