//! Deposit-address records and mint bindings.

use serde::{Deserialize, Serialize};

use crate::DecimalAmount;

/// A deposit address that has been handed out and may never be reissued.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsedDepositAddress {
    pub address: String,
}

/// Binding from a mint-chain address to the deposit address that funds it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintDepositAddress {
    pub mint_address: String,
    /// Unique across all bindings.
    pub deposit_address: String,
    /// Opaque to the ledger.
    pub redeem_script: String,
    /// The only field that changes after creation.
    #[serde(default)]
    pub approved_tax: DecimalAmount,
}

/// Tax approval for one binding, keyed by deposit address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintDepositAddressUpdate {
    pub deposit_address: String,
    pub approved_tax: DecimalAmount,
}

impl MintDepositAddressUpdate {
    pub fn new(deposit_address: impl Into<String>, approved_tax: DecimalAmount) -> Self {
        Self {
            deposit_address: deposit_address.into(),
            approved_tax,
        }
    }
}
