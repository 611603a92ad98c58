// ── Runtime backend configuration ──
//
// Describes *how* to reach the desktop backend's command bridge. Core
// never reads config files; the CLI builds a `BackendConfig` and hands
// it in.

use std::time::Duration;

use url::Url;

/// Default loopback address of the command bridge.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:1421";

/// Configuration for connecting to the backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Command bridge root (e.g., `http://127.0.0.1:1421`).
    pub url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Load every persisted connection config as part of `connect()`.
    pub load_on_connect: bool,
}

impl BackendConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(30),
            load_on_connect: true,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(
            Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
        )
    }
}
