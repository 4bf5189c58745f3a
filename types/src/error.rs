//! Error type for parsing and validating ledger values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid decimal amount {value:?}: {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("invalid network topology: {0}")]
    Topology(String),
}
