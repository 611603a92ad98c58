use thiserror::Error;

/// Top-level error type for the `bodhi-api` crate.
///
/// Covers every failure mode of the command bridge: transport, envelope
/// decoding, backend-reported failures, and operations the backend does
/// not offer. `bodhi-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to set up bridge client: {0}")]
    ClientSetup(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// The backend ran the command and reported a failure
    /// (`{"ok": false, "error": "..."}` envelope).
    #[error("{command} failed: {message}")]
    Backend { command: String, message: String },

    /// The bridge answered with a non-success HTTP status.
    #[error("Bridge returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Capability ──────────────────────────────────────────────────
    /// The backend has no implementation for this operation. Raised
    /// locally, before any request is sent.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The client itself never retries; callers decide.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The message reported by the backend, if the failure came from it.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Backend { message, .. } => Some(message),
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}
