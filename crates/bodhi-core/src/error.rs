// ── Core error types ──
//
// User-facing errors from bodhi-core. Consumers never see HTTP status
// codes or envelope parse failures directly: the `From<bodhi_api::Error>`
// impl folds transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation errors (raised before any backend call) ───────────
    #[error("Invalid host: '{host}' must not contain whitespace")]
    InvalidHost { host: String },

    #[error("Invalid Redis database index: '{value}' is not a non-negative integer")]
    InvalidDatabaseIndex { value: String },

    #[error("Unsupported database type: {db_type}")]
    UnsupportedType { db_type: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation not supported: {operation} (requires {required})")]
    Unsupported { operation: String, required: String },

    // ── Backend errors ───────────────────────────────────────────────
    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Backend disconnected")]
    BackendDisconnected,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the failure was detected locally, before the backend was
    /// contacted (bad input or an operation the backend cannot perform).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidHost { .. }
                | Self::InvalidDatabaseIndex { .. }
                | Self::UnsupportedType { .. }
                | Self::ValidationFailed { .. }
                | Self::Unsupported { .. }
        )
    }

    /// Whether the failure came from the backend or the path to it.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Self::Backend { .. } | Self::ConnectionFailed { .. } | Self::Timeout { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bodhi_api::Error> for CoreError {
    fn from(err: bodhi_api::Error) -> Self {
        match err {
            bodhi_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Backend {
                        message: e.to_string(),
                    }
                }
            }
            bodhi_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            bodhi_api::Error::ClientSetup(message) => CoreError::Config { message },
            bodhi_api::Error::Backend { message, .. } => CoreError::Backend { message },
            bodhi_api::Error::Http { status, body } => CoreError::Backend {
                message: format!("HTTP {status}: {body}"),
            },
            bodhi_api::Error::Deserialization { message, .. } => CoreError::Backend {
                message: format!("malformed backend response: {message}"),
            },
            bodhi_api::Error::UnsupportedOperation(operation) => CoreError::Unsupported {
                operation: operation.into(),
                required: "a backend with a driver for this database type".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failure_keeps_message() {
        let err = CoreError::from(bodhi_api::Error::Backend {
            command: "add_redis_connection".into(),
            message: "Connection refused".into(),
        });
        assert!(matches!(err, CoreError::Backend { ref message } if message == "Connection refused"));
        assert!(err.is_backend());
        assert!(!err.is_validation());
    }

    #[test]
    fn unsupported_operation_is_validation_class() {
        let err = CoreError::from(bodhi_api::Error::UnsupportedOperation("PostgreSQL"));
        assert!(err.is_validation());
        assert!(err.to_string().contains("PostgreSQL"));
    }
}
