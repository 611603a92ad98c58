// ── Domain model ──
//
// Canonical types shared by the store, the command layer, and consumers.
// Wire records from `bodhi-api` are mapped into these by `convert`.

pub mod connection;
pub mod entity_id;
pub mod pipeline;
pub mod strategy;

pub use connection::{ConnectionConfig, DatabaseType};
pub use entity_id::EntityId;
pub use pipeline::{LogLevel, PipelineTask, TaskLogEntry, TaskStatus};
pub use strategy::{MigrationStrategy, StrategyType, Transformer};
