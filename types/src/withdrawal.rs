//! Withdrawal (burn) records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DecimalAmount;

/// Identifies one burn transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalKey {
    pub burn_address: String,
    pub burn_index: u32,
}

impl WithdrawalKey {
    pub fn new(burn_address: impl Into<String>, burn_index: u32) -> Self {
        Self {
            burn_address: burn_address.into(),
            burn_index,
        }
    }
}

impl fmt::Display for WithdrawalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.burn_address, self.burn_index)
    }
}

/// A registered withdrawal awaiting (or past) amount and tax approval.
///
/// A record is unapproved while `approved_tax` is exactly `"0"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub burn_address: String,
    pub burn_index: u32,
    #[serde(default)]
    pub approved_amount: DecimalAmount,
    #[serde(default)]
    pub approved_tax: DecimalAmount,
}

impl Withdrawal {
    /// A freshly registered withdrawal with zero amount and tax.
    pub fn new(burn_address: impl Into<String>, burn_index: u32) -> Self {
        Self {
            burn_address: burn_address.into(),
            burn_index,
            approved_amount: DecimalAmount::zero(),
            approved_tax: DecimalAmount::zero(),
        }
    }

    pub fn key(&self) -> WithdrawalKey {
        WithdrawalKey::new(self.burn_address.clone(), self.burn_index)
    }

    pub fn is_approved(&self) -> bool {
        !self.approved_tax.is_zero()
    }
}

/// Approved amount and tax for one withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalUpdate {
    pub burn_address: String,
    pub burn_index: u32,
    pub approved_amount: DecimalAmount,
    pub approved_tax: DecimalAmount,
}

impl WithdrawalUpdate {
    pub fn key(&self) -> WithdrawalKey {
        WithdrawalKey::new(self.burn_address.clone(), self.burn_index)
    }
}
