//! Error types for db-bridge.
//!
//! All fallible operations return [`DbResult`]. Errors fall into two kinds:
//! configuration errors (programming or setup mistakes, never retried) and
//! execution errors (driver-level failures, eligible for the reconnect
//! policy). Each variant carries an actionable suggestion where one exists.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration error: {message}")]
    Configuration { message: String, suggestion: String },

    #[error("Invalid connection URI for driver '{driver}': {uri}")]
    InvalidUri { uri: String, driver: String },

    #[error("Not connected: '{operation}' requires an open connection")]
    NotConnected { operation: String },

    #[error("Execution failed: {message}")]
    Execution {
        message: String,
        /// e.g. "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },
}

/// Coarse error classification used by the reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Execution,
}

impl DbError {
    /// Create a configuration error with a helpful suggestion.
    pub fn configuration(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an invalid-URI error. Callers mask credentials before this point.
    pub fn invalid_uri(uri: impl Into<String>, driver: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            driver: driver.into(),
        }
    }

    /// Create a not-connected error for the named operation.
    pub fn not_connected(operation: impl Into<String>) -> Self {
        Self::NotConnected {
            operation: operation.into(),
        }
    }

    /// Create an execution error with optional SQLSTATE code.
    pub fn execution(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Execution {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Classify this error for the retry policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::InvalidUri { .. } | Self::NotConnected { .. } => {
                ErrorKind::Configuration
            }
            Self::Execution { .. } => ErrorKind::Execution,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Configuration { suggestion, .. } => Some(suggestion),
            Self::Execution { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error may be resolved by reconnecting.
    ///
    /// Configuration errors indicate a setup mistake and are never retried.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Execution
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::configuration(
                msg.to_string(),
                "Check the connection URI format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::execution(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::Io(io_err) => DbError::execution(
                format!("I/O error: {}", io_err),
                None,
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::execution(
                format!("TLS error: {}", tls_err),
                None,
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::execution(
                format!("Protocol error: {}", msg),
                None,
                "Check database server compatibility",
            ),
            sqlx::Error::RowNotFound => DbError::execution(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::ColumnDecode { index, source } => DbError::execution(
                format!("Failed to decode column {}: {}", index, source),
                None,
                "Check the column type mapping",
            ),
            sqlx::Error::Decode(source) => DbError::execution(
                format!("Decode error: {}", source),
                None,
                "Check the result type mapping",
            ),
            sqlx::Error::WorkerCrashed => DbError::execution(
                "Database worker crashed",
                None,
                "Reconnect to the database",
            ),
            _ => DbError::execution(
                format!("Driver error: {}", err),
                None,
                "Check database driver status",
            ),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DbError::configuration("bad option", "Check retry_times");
        assert!(err.to_string().contains("Configuration error"));

        let err = DbError::not_connected("execute");
        assert!(err.to_string().contains("execute"));
        assert!(err.to_string().contains("open connection"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            DbError::configuration("m", "s").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            DbError::invalid_uri("mysql://", "mysql").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            DbError::not_connected("call").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            DbError::execution("m", None, "s").kind(),
            ErrorKind::Execution
        );
    }

    #[test]
    fn test_error_retryable() {
        assert!(DbError::execution("connection reset", None, "reconnect").is_retryable());
        assert!(!DbError::not_connected("execute").is_retryable());
        assert!(!DbError::invalid_uri("x", "mysql").is_retryable());
        assert!(!DbError::configuration("m", "s").is_retryable());
    }

    #[test]
    fn test_error_suggestion() {
        let err = DbError::execution("syntax error", Some("42601".to_string()), "Check SQL syntax");
        assert_eq!(err.suggestion(), Some("Check SQL syntax"));
        assert!(DbError::not_connected("execute").suggestion().is_none());
    }

    #[test]
    fn test_sqlx_io_error_maps_to_execution() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: DbError = sqlx::Error::Io(io).into();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_sqlx_protocol_error_maps_to_execution() {
        let err: DbError = sqlx::Error::Protocol("unexpected packet".to_string()).into();
        assert!(matches!(err, DbError::Execution { .. }));
    }
}
