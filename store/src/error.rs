use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key was inserted twice.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A lookup that must match at most one row matched several.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("schema migration error: {0}")]
    Migration(String),
}
