//! Reactive data layer between `bodhi-api` and UI consumers (CLI / desktop views).
//!
//! This crate owns the domain model and the reconciling cache for Bodhi's
//! connection configs, migration strategies, and pipeline tasks:
//!
//! - **[`AppStore`]**: Central facade. [`connect()`](AppStore::connect)
//!   builds the bridge client and spawns the command processor;
//!   mutations such as [`save_connection_config()`](AppStore::save_connection_config)
//!   are routed through it, reconciled against backend-assigned identity,
//!   and merged into the cache. [`AppStore::oneshot()`] wraps a single
//!   connect/run/disconnect cycle for CLI use.
//!
//! - **[`DataStore`]**: Reactive storage built on an ordered
//!   `EntityCollection<T>` (`IndexMap` + `tokio::sync::watch` channels).
//!
//! - **[`EntityStream<T>`]**: Subscription handle vended by the `DataStore`.
//!   Exposes `current()` / `latest()` / `changed()` / `into_stream()`.
//!
//! - **[`Command`]**: Typed mutation requests sent over an `mpsc` channel
//!   to the single command processor, so they apply in issue order.
//!
//! - **Helpers**: [`build_redis_url`] for Redis connection URLs with
//!   encoded, log-redacted credentials, and [`validate_connection_config`]
//!   for form-level checks.

pub mod app_store;
pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod redis_url;
pub mod store;
pub mod stream;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use app_store::{AppStore, BackendState};
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::BackendConfig;
pub use error::CoreError;
pub use redis_url::{RedisUrl, build_redis_url, parse_database_index, redact_url};
pub use store::DataStore;
pub use stream::EntityStream;
pub use validate::{
    ValidationIssue, ensure_valid, generate_placeholder_id, validate_connection_config,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ConnectionConfig, DatabaseType, EntityId, LogLevel, MigrationStrategy, PipelineTask,
    StrategyType, TaskLogEntry, TaskStatus, Transformer,
};
