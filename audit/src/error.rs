use thiserror::Error;

/// Failures on the audit path. These are logged, never returned to ledger callers.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit store connection failed: {0}")]
    Connect(String),

    #[error("no authority node matches hostname {hostname}")]
    NodeNotFound { hostname: String },

    #[error("node identity unavailable: {0}")]
    Identity(String),

    #[error("audit store write failed: {0}")]
    Write(String),

    #[error("fallback log write failed: {0}")]
    Fallback(#[from] std::io::Error),

    #[error("audit record lost (store: {write}; fallback: {fallback})")]
    MirrorUnavailable { write: String, fallback: String },
}
