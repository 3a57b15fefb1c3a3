use thiserror::Error;

/// Failures surfaced by the storage ports.
///
/// Store failures are never retried inside the core; callers map them to a
/// generic server error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No connection could be acquired from the pool.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The statement failed while executing.
    #[error("Query failed: {0}")]
    Query(String),
}

/// Result alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(feature = "database")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.message().to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}
