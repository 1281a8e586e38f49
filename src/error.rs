//! Error types for download-sync

use thiserror::Error;

/// Result type alias for download-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for download-sync
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Execution service rejected a signal
    #[error("execution service error: {0}")]
    Executor(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_display_includes_query_context() {
        let err = Error::Database(DatabaseError::QueryFailed("timeout".into()));
        assert_eq!(err.to_string(), "database error: query failed: timeout");
    }

    #[test]
    fn executor_error_display_includes_reason() {
        let err = Error::Executor("channel closed".into());
        assert_eq!(err.to_string(), "execution service error: channel closed");
    }

    #[test]
    fn database_error_converts_via_from() {
        let err: Error = DatabaseError::ConnectionFailed("refused".into()).into();
        assert!(matches!(err, Error::Database(DatabaseError::ConnectionFailed(_))));
    }

    #[test]
    fn other_error_display_is_bare_message() {
        assert_eq!(Error::Other("boom".into()).to_string(), "boom");
    }
}
