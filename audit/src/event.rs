//! Ledger mutations as recorded by the audit mirror.

use serde::{Deserialize, Serialize};

use custody_types::DecimalAmount;

/// One mirrored mutation, or a free-form diagnostic entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    UsedDepositAddress {
        address: String,
    },
    MintDepositAddress {
        mint_address: String,
        deposit_address: String,
        redeem_script: String,
        approved_tax: DecimalAmount,
    },
    MintDepositAddressUpdated {
        deposit_address: String,
        approved_tax: DecimalAmount,
    },
    Withdrawal {
        burn_address: String,
        burn_index: u32,
        approved_amount: DecimalAmount,
        approved_tax: DecimalAmount,
    },
    WithdrawalUpdated {
        burn_address: String,
        burn_index: u32,
        approved_amount: DecimalAmount,
        approved_tax: DecimalAmount,
    },
    Debug {
        log_type: String,
        message: String,
        details: Option<serde_json::Value>,
    },
}

impl AuditEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UsedDepositAddress { .. } => "used_deposit_address",
            Self::MintDepositAddress { .. } => "mint_deposit_address",
            Self::MintDepositAddressUpdated { .. } => "mint_deposit_address_updated",
            Self::Withdrawal { .. } => "withdrawal",
            Self::WithdrawalUpdated { .. } => "withdrawal_updated",
            Self::Debug { .. } => "debug",
        }
    }

    /// Label for the fallback log: the event kind, or the caller's type for
    /// diagnostic entries.
    pub fn log_type(&self) -> &str {
        match self {
            Self::Debug { log_type, .. } => log_type.as_str(),
            other => other.kind(),
        }
    }

    /// One-line description for log output.
    pub fn summary(&self) -> String {
        match self {
            Self::UsedDepositAddress { address } => format!("used deposit address {address}"),
            Self::MintDepositAddress {
                mint_address,
                deposit_address,
                ..
            } => format!("mint address {mint_address} bound to {deposit_address}"),
            Self::MintDepositAddressUpdated {
                deposit_address,
                approved_tax,
            } => format!("deposit address {deposit_address} approved tax {approved_tax}"),
            Self::Withdrawal {
                burn_address,
                burn_index,
                ..
            } => format!("withdrawal {burn_address}#{burn_index} registered"),
            Self::WithdrawalUpdated {
                burn_address,
                burn_index,
                approved_amount,
                approved_tax,
            } => format!(
                "withdrawal {burn_address}#{burn_index} approved amount {approved_amount} tax {approved_tax}"
            ),
            Self::Debug { message, .. } => message.clone(),
        }
    }

    /// Structured payload for the fallback log.
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::Debug {
                details: Some(details),
                ..
            } => details.clone(),
            other => serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
        }
    }
}
