// ── Connection config validation ──
//
// Form-level checks run before any backend call. Returns every problem
// found, not just the first, so a form can mark all offending fields.

use std::fmt;

use crate::error::CoreError;
use crate::model::{ConnectionConfig, DatabaseType, EntityId};

/// A single field-level problem with a connection config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a config for missing or out-of-range fields.
///
/// Redis configs may omit host and port; the URL builder fills in
/// `localhost:6379`.
pub fn validate_connection_config(config: &ConnectionConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if config.name.trim().is_empty() {
        issues.push(ValidationIssue {
            field: "name",
            message: "name must not be empty".into(),
        });
    }

    if matches!(&config.db_type, DatabaseType::Other(t) if t.trim().is_empty()) {
        issues.push(ValidationIssue {
            field: "type",
            message: "database type must not be empty".into(),
        });
    }

    if config.db_type != DatabaseType::Redis {
        if config.host.as_deref().is_none_or(|h| h.trim().is_empty()) {
            issues.push(ValidationIssue {
                field: "host",
                message: "host must not be empty".into(),
            });
        }
        if config.port.is_none_or(|p| p == 0) {
            issues.push(ValidationIssue {
                field: "port",
                message: "port must be between 1 and 65535".into(),
            });
        }
    }

    issues
}

/// Validate and fold all issues into one `ValidationFailed` error.
pub fn ensure_valid(config: &ConnectionConfig) -> Result<(), CoreError> {
    let issues = validate_connection_config(config);
    if issues.is_empty() {
        return Ok(());
    }
    Err(CoreError::ValidationFailed {
        message: issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    })
}

/// A fresh placeholder id for a config the backend has not seen yet.
pub fn generate_placeholder_id() -> EntityId {
    EntityId::placeholder()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn redis_needs_only_a_name() {
        let mut config = ConnectionConfig::new("cache", DatabaseType::Redis);
        config.port = None;
        assert!(validate_connection_config(&config).is_empty());
    }

    #[test]
    fn mysql_requires_host_and_port() {
        let mut config = ConnectionConfig::new("  ", DatabaseType::MySql);
        config.host = Some(" ".into());
        config.port = Some(0);

        let fields: Vec<&str> = validate_connection_config(&config)
            .iter()
            .map(|i| i.field)
            .collect();
        assert_eq!(fields, ["name", "host", "port"]);
    }

    #[test]
    fn ensure_valid_joins_messages() {
        let config = ConnectionConfig::new("", DatabaseType::PostgreSql);
        let err = ensure_valid(&config).unwrap_err();
        let CoreError::ValidationFailed { message } = err else {
            panic!("expected ValidationFailed, got {err:?}");
        };
        assert!(message.contains("name"));
        assert!(message.contains("host"));
    }

    #[test]
    fn generated_ids_are_placeholders() {
        assert!(generate_placeholder_id().is_placeholder());
    }
}
