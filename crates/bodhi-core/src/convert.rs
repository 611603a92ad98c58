// ── Wire-to-domain type conversions ──
//
// Bridges raw `bodhi_api` records into canonical `bodhi_core::model` types
// and back. Strings from the wire are parsed into strong types here; the
// password is only ever exposed when building an outgoing record.

use secrecy::{ExposeSecret, SecretString};

use bodhi_api::bridge::models::{
    DatabaseConfigRecord, NewPipelineTaskRecord, PipelineTaskRecord, TaskLogRecord,
};

use crate::command::CreatePipelineTaskRequest;
use crate::error::CoreError;
use crate::model::{
    ConnectionConfig, DatabaseType, EntityId, LogLevel, PipelineTask, TaskLogEntry, TaskStatus,
};

// ── Connection configs ─────────────────────────────────────────────

impl From<DatabaseConfigRecord> for ConnectionConfig {
    fn from(r: DatabaseConfigRecord) -> Self {
        Self {
            id: (!r.id.is_empty()).then(|| EntityId::from(r.id)),
            name: r.name,
            db_type: DatabaseType::from(r.db_type),
            host: r.host,
            port: r.port,
            username: r.username,
            password: r.password.map(SecretString::from),
            database: r.database,
            ssl: r.ssl,
            extra: r.extra,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Build the record persisted for `config` under `id`. Every field but the
/// id comes from the caller, timestamps included.
pub(crate) fn to_config_record(config: &ConnectionConfig, id: &EntityId) -> DatabaseConfigRecord {
    DatabaseConfigRecord {
        id: id.to_string(),
        name: config.name.clone(),
        db_type: config.db_type.to_string(),
        host: config.host.clone(),
        port: config.port,
        username: config.username.clone(),
        password: config
            .password
            .as_ref()
            .map(|p| p.expose_secret().to_owned()),
        database: config.database.clone(),
        ssl: config.ssl,
        extra: config.extra.clone(),
        created_at: config.created_at,
        updated_at: config.updated_at,
    }
}

// ── Pipeline tasks ─────────────────────────────────────────────────

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, CoreError> {
    raw.parse().map_err(|_| CoreError::Backend {
        message: format!("unrecognized task {field} '{raw}'"),
    })
}

impl TryFrom<TaskLogRecord> for TaskLogEntry {
    type Error = CoreError;

    fn try_from(r: TaskLogRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            level: parse_field::<LogLevel>("log level", &r.level)?,
            timestamp: r.timestamp,
            message: r.message,
        })
    }
}

impl TryFrom<PipelineTaskRecord> for PipelineTask {
    type Error = CoreError;

    fn try_from(r: PipelineTaskRecord) -> Result<Self, Self::Error> {
        let logs = r
            .logs
            .into_iter()
            .map(TaskLogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            status: parse_field::<TaskStatus>("status", &r.status)?,
            id: EntityId::from(r.id),
            name: r.name,
            source_db_id: EntityId::from(r.source_db_id),
            target_db_id: EntityId::from(r.target_db_id),
            strategy_id: EntityId::from(r.strategy_id),
            progress: r.progress,
            start_time: r.start_time,
            end_time: r.end_time,
            error: r.error,
            logs,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

impl From<&CreatePipelineTaskRequest> for NewPipelineTaskRecord {
    fn from(req: &CreatePipelineTaskRequest) -> Self {
        Self {
            name: req.name.clone(),
            source_db_id: req.source_db_id.to_string(),
            target_db_id: req.target_db_id.to_string(),
            strategy_id: req.strategy_id.to_string(),
            start_time: req.start_time,
            end_time: req.end_time,
            error: req.error.clone(),
            logs: req.logs.iter().map(TaskLogRecord::from).collect(),
        }
    }
}

impl From<&TaskLogEntry> for TaskLogRecord {
    fn from(entry: &TaskLogEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            message: entry.message.clone(),
            level: entry.level.to_string(),
        }
    }
}
