//! CLI configuration: a thin wrapper around `bodhi_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--backend, --timeout).

use std::time::Duration;

use bodhi_core::BackendConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use bodhi_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `BackendConfig` from the config file, profile, and CLI overrides.
///
/// Flags take priority over profile values. Commands load what they need,
/// so the initial listing on connect is always skipped.
pub fn resolve_backend_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<BackendConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);
    let profile = cfg.profiles.get(&profile_name);

    let mut backend = match (global.backend.as_deref(), profile) {
        (Some(url), _) => BackendConfig {
            url: bodhi_config::parse_backend_url(url)?,
            timeout: Duration::from_secs(
                profile
                    .and_then(|p| p.timeout)
                    .unwrap_or(cfg.defaults.timeout),
            ),
            load_on_connect: false,
        },
        (None, Some(profile)) => bodhi_config::profile_to_backend_config(profile, &cfg.defaults)?,
        (None, None) if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(secs) = global.timeout {
        backend.timeout = Duration::from_secs(secs);
    }
    backend.load_on_connect = false;

    Ok(backend)
}
