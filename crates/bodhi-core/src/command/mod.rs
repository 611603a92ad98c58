// ── Command API ──
//
// All write operations flow through a unified `Command` enum, routed by
// the AppStore's single command processor so they apply in issue order.

pub mod requests;

use std::sync::Arc;

use crate::error::CoreError;
use crate::model::{ConnectionConfig, EntityId, PipelineTask};

pub use requests::CreatePipelineTaskRequest;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All operations that touch the backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Connection configs ───────────────────────────────────────────
    /// Register (if new) and persist a config, then merge it into the cache.
    SaveConnectionConfig(Box<ConnectionConfig>),
    /// Replace the cached configs with the backend's full listing.
    LoadConnectionConfigs,
    /// Tear down the live connection, delete the persisted config, then
    /// drop it from the cache.
    RemoveConnectionConfig { id: EntityId },
    TestConnection { id: EntityId },

    // ── Pipeline tasks ───────────────────────────────────────────────
    CreatePipelineTask(Box<CreatePipelineTaskRequest>),
    StartPipelineTask { id: EntityId },
    LoadPipelineTasks,
    RefreshPipelineTask { id: EntityId },
}

/// Result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Connection(Arc<ConnectionConfig>),
    /// Number of entities now cached after a full listing.
    Loaded(usize),
    ConnectionTested(bool),
    Task(Arc<PipelineTask>),
    /// `None` when the backend no longer knows the task.
    TaskRefreshed(Option<Arc<PipelineTask>>),
}
