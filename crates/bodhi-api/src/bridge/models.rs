// Command bridge wire types
//
// Request and response shapes exactly as the desktop backend expects them:
// camelCase keys, ISO-8601 timestamps, enums as lowercase strings. Domain
// typing (enums, secrets, identities) is applied by `bodhi-core`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard bridge response envelope.
///
/// ```json
/// { "ok": true, "data": ... }
/// { "ok": false, "error": "message" }
/// ```
#[derive(Debug, Deserialize)]
pub struct InvokeResponse {
    pub ok: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Connection registration ─────────────────────────────────────────

/// Arguments for `add_mysql_connection`.
#[derive(Clone, Serialize)]
pub struct MysqlConnectionRequest {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for MysqlConnectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlConnectionRequest")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Arguments for `add_redis_connection`. `url` may embed credentials.
#[derive(Clone, Serialize)]
pub struct RedisConnectionRequest {
    pub url: String,
    pub db: u32,
}

impl fmt::Debug for RedisConnectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConnectionRequest")
            .field("url", &"<redacted>")
            .field("db", &self.db)
            .finish()
    }
}

// ── Persisted connection config ─────────────────────────────────────

/// A connection config as stored by the backend's SQLite persistence.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfigRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub db_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for DatabaseConfigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfigRecord")
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

// ── Pipeline tasks ──────────────────────────────────────────────────

/// One log line attached to a pipeline task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLogRecord {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub level: String,
}

/// A pipeline task as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTaskRecord {
    pub id: String,
    pub name: String,
    pub source_db_id: String,
    pub target_db_id: String,
    pub strategy_id: String,
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub logs: Vec<TaskLogRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task creation payload. Identity, status, progress and the
/// created/updated stamps are assigned by the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPipelineTaskRecord {
    pub name: String,
    pub source_db_id: String,
    pub target_db_id: String,
    pub strategy_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<TaskLogRecord>,
}
