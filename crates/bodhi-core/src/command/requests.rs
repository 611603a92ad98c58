// ── Typed request structs for Command payloads ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{EntityId, TaskLogEntry};

// ── Pipeline tasks ─────────────────────────────────────────────────

/// Everything the caller decides about a new pipeline task. Identity,
/// status, progress and the created/updated stamps are assigned by the
/// backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePipelineTaskRequest {
    pub name: String,
    pub source_db_id: EntityId,
    pub target_db_id: EntityId,
    pub strategy_id: EntityId,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub logs: Vec<TaskLogEntry>,
}

impl CreatePipelineTaskRequest {
    /// A request with no run history.
    pub fn new(
        name: impl Into<String>,
        source_db_id: EntityId,
        target_db_id: EntityId,
        strategy_id: EntityId,
    ) -> Self {
        Self {
            name: name.into(),
            source_db_id,
            target_db_id,
            strategy_id,
            start_time: None,
            end_time: None,
            error: None,
            logs: Vec::new(),
        }
    }
}
