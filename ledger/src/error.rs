use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Storage(#[from] custody_store::StoreError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("deposit address already used: {0}")]
    DepositAddressReused(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<custody_types::TypesError> for LedgerError {
    fn from(e: custody_types::TypesError) -> Self {
        LedgerError::InvalidInput(e.to_string())
    }
}
