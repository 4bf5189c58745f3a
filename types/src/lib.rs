//! Fundamental types for the custodial bridge ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! deposit-address records, mint bindings, withdrawal records, decimal amounts,
//! and the node identity derived from the authority-node topology.

pub mod amount;
pub mod deposit;
pub mod error;
pub mod identity;
pub mod topology;
pub mod withdrawal;

pub use amount::DecimalAmount;
pub use deposit::{MintDepositAddress, MintDepositAddressUpdate, UsedDepositAddress};
pub use error::TypesError;
pub use identity::NodeIdentity;
pub use topology::{AuthorityNode, NetworkConfig, NetworkTopology};
pub use withdrawal::{Withdrawal, WithdrawalKey, WithdrawalUpdate};
