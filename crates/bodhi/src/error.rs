//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bodhi_config::ConfigError;
use bodhi_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const BACKEND: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the Bodhi backend at {url}: {reason}")]
    #[diagnostic(
        code(bodhi::connection_failed),
        help(
            "Check that the Bodhi desktop app is running and its command bridge is enabled.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(bodhi::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("Backend error: {message}")]
    #[diagnostic(code(bodhi::backend))]
    Backend { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(bodhi::not_found),
        help("Run: bodhi {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Unsupported ──────────────────────────────────────────────────

    #[error("Operation '{operation}' is not supported")]
    #[diagnostic(code(bodhi::unsupported), help("This requires {required}."))]
    Unsupported { operation: String, required: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bodhi::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(bodhi::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: bodhi config set-profile <name> --backend <url>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(bodhi::no_config),
        help(
            "Pass --backend <url>, set BODHI_BACKEND, or add a profile with:\n\
             bodhi config set-profile default --backend http://127.0.0.1:1421\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(bodhi::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(bodhi::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Backend { .. } => exit_code::BACKEND,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidHost { host } => CliError::Validation {
                field: "host".into(),
                reason: format!("'{host}' contains whitespace"),
            },

            CoreError::InvalidDatabaseIndex { value } => CliError::Validation {
                field: "database".into(),
                reason: format!("'{value}' is not a Redis database index"),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::UnsupportedType { db_type } => CliError::Unsupported {
                operation: format!("register {db_type} connection"),
                required: "one of mysql, postgresql, redis".into(),
            },

            CoreError::Unsupported {
                operation,
                required,
            } => CliError::Unsupported {
                operation,
                required,
            },

            CoreError::Backend { message } => CliError::Backend { message },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::BackendDisconnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                reason: "backend connection was lost".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::Backend {
                message: format!("internal: {message}"),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_usage_errors() {
        let err = CliError::from(CoreError::InvalidHost {
            host: "bad host".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn backend_errors_keep_their_message() {
        let err = CliError::from(CoreError::Backend {
            message: "connection refused by mysql".into(),
        });
        assert_eq!(err.exit_code(), exit_code::BACKEND);
        assert!(err.to_string().contains("connection refused by mysql"));
    }

    #[test]
    fn lost_backend_is_a_connection_error() {
        let err = CliError::from(CoreError::BackendDisconnected);
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
