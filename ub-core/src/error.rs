//! Global error types for the Ubicasure client.
//!
//! All error categories across the application are unified into a single
//! `UbError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using UbError.
pub type UbResult<T> = Result<T, UbError>;

/// Unified error type covering all error categories in the client.
#[derive(Error, Debug)]
pub enum UbError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Local storage errors --
    /// SQLite database error.
    #[error("database error: {0}")]
    Database(String),

    /// Database migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Database integrity check failed.
    #[error("database integrity check failed: {0}")]
    IntegrityCheck(String),

    // -- Network errors --
    /// HTTP request failed (connection refused, DNS, malformed request).
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Server answered with a non-success status.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The backend reported that the resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    // -- Identity errors --
    /// The identity provider rejected the credentials or request.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A required field was empty or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    // -- Messaging errors --
    /// The backend refused to accept a message or action.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The live message subscription failed.
    #[error("subscription error: {0}")]
    Subscription(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Service errors --
    /// A service failed to initialize.
    #[error("service init error: {0}")]
    ServiceInit(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl UbError {
    /// Whether this error is a network-layer failure (as opposed to a local one).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout(_) | Self::ServerError { .. } | Self::NotFound(_)
        )
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for UbError {
    fn from(e: serde_json::Error) -> Self {
        UbError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for UbError {
    fn from(e: toml::de::Error) -> Self {
        UbError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ub_error_display() {
        let err = UbError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn test_server_error_display_and_status() {
        let err = UbError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "server error (status 503): unavailable");
        assert_eq!(err.status(), Some(503));
        assert!(err.is_network());
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = UbError::NotFound("/chats/x".into());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_local_errors_are_not_network() {
        assert!(!UbError::Validation("empty".into()).is_network());
        assert!(!UbError::Database("locked".into()).is_network());
    }
}
