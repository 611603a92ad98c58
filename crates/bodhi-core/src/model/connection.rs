// ── Connection config domain types ──

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// Database engine behind a connection.
///
/// Unknown engine names are kept verbatim in `Other` so a config written
/// by a newer backend survives a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatabaseType {
    MySql,
    PostgreSql,
    Redis,
    Other(String),
}

impl DatabaseType {
    /// Conventional listening port, if the engine has one.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::MySql => Some(3306),
            Self::PostgreSql => Some(5432),
            Self::Redis => Some(6379),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::Redis => "redis",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<String> for DatabaseType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "mysql" => Self::MySql,
            "postgresql" => Self::PostgreSql,
            "redis" => Self::Redis,
            _ => Self::Other(s),
        }
    }
}

impl From<DatabaseType> for String {
    fn from(t: DatabaseType) -> Self {
        match t {
            DatabaseType::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

// ── ConnectionConfig ────────────────────────────────────────────────

/// How to reach one database.
///
/// The password never leaves this type through `Debug` or serde; it is
/// only exposed when building a backend request.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(rename = "type")]
    pub db_type: DatabaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip)]
    pub password: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConnectionConfig {
    /// A fresh, unregistered config stamped with the current time and a
    /// placeholder id.
    pub fn new(name: impl Into<String>, db_type: DatabaseType) -> Self {
        let now = Utc::now();
        Self {
            id: Some(EntityId::placeholder()),
            name: name.into(),
            port: db_type.default_port(),
            db_type,
            host: None,
            username: None,
            password: None,
            database: None,
            ssl: None,
            extra: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A config is new until the backend has registered it: no id, an
    /// empty id, or a placeholder id.
    pub fn is_new(&self) -> bool {
        self.id
            .as_ref()
            .is_none_or(|id| id.is_empty() || id.is_placeholder())
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("ssl", &self.ssl)
            .field("extra", &self.extra)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn database_type_round_trips_unknown_names() {
        let t: DatabaseType = "mongodb".parse().unwrap();
        assert_eq!(t, DatabaseType::Other("mongodb".into()));
        assert_eq!(String::from(t), "mongodb");
        assert_eq!(DatabaseType::from("redis".to_owned()), DatabaseType::Redis);
    }

    #[test]
    fn new_config_is_new_until_assigned() {
        let mut config = ConnectionConfig::new("cache", DatabaseType::Redis);
        assert!(config.is_new());
        assert_eq!(config.port, Some(6379));

        config.id = None;
        assert!(config.is_new());

        config.id = Some(EntityId::from(""));
        assert!(config.is_new());

        config.id = Some(EntityId::from("redis-7"));
        assert!(!config.is_new());
    }

    #[test]
    fn debug_never_prints_password() {
        let mut config = ConnectionConfig::new("orders", DatabaseType::MySql);
        config.password = Some("hunter2".to_owned().into());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn serde_uses_camel_case_and_type_key() {
        let config: ConnectionConfig = serde_json::from_value(serde_json::json!({
            "id": "conn-1",
            "name": "orders",
            "type": "mysql",
            "host": "10.0.0.5",
            "port": 3306,
            "createdAt": "2024-06-15T10:30:00Z",
            "updatedAt": "2024-06-15T10:30:00Z"
        }))
        .unwrap();
        assert_eq!(config.db_type, DatabaseType::MySql);
        assert_eq!(config.id, Some(EntityId::from("conn-1")));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "mysql");
        assert!(json.get("password").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
