use sea_orm::DbErr;

/// Errors raised by a [`ReportStore`](crate::ReportStore).
///
/// `NotConfigured` and `UnsupportedBackend` are configuration problems, not
/// empty results: callers must surface them rather than treat them as "no
/// reports".
///
/// # Examples
///
/// ```rust
/// use csvinsight_storage::StorageError;
///
/// let err = StorageError::NotConfigured;
/// assert_eq!(err.to_string(), "DATABASE_URL is not set");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No connection string was provided.
    #[error("DATABASE_URL is not set")]
    NotConfigured,

    /// The connection string names a database this service cannot talk to.
    #[error("unsupported database URL scheme '{0}' (expected sqlite, file or postgres)")]
    UnsupportedBackend(String),

    /// Connection or query failure reported by the driver.
    #[error("{0}")]
    Database(#[from] DbErr),

    /// Local filesystem failure while preparing a file-backed database.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Generic storage error for cases not covered by other variants.
    #[error("{0}")]
    Other(String),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
