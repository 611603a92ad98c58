// ── Central reactive data store ──
//
// In-memory cache of connection configs, migration strategies, and
// pipeline tasks. Reads are public; mutations are crate-private so only
// the command processor can write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{ConnectionConfig, EntityId, MigrationStrategy, PipelineTask};
use crate::stream::EntityStream;

/// Reactive cache for all Bodhi domain entities.
///
/// Mutations are broadcast to subscribers via `watch` channels. The
/// backend is the source of truth; the whole cache can be rebuilt from a
/// full listing at any time.
pub struct DataStore {
    pub(crate) connections: EntityCollection<ConnectionConfig>,
    pub(crate) strategies: EntityCollection<MigrationStrategy>,
    pub(crate) tasks: EntityCollection<PipelineTask>,
    pub(crate) last_connection_refresh: watch::Sender<Option<DateTime<Utc>>>,
    pub(crate) last_task_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_connection_refresh, _) = watch::channel(None);
        let (last_task_refresh, _) = watch::channel(None);

        Self {
            connections: EntityCollection::new(),
            strategies: EntityCollection::new(),
            tasks: EntityCollection::new(),
            last_connection_refresh,
            last_task_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn connections_snapshot(&self) -> Arc<Vec<Arc<ConnectionConfig>>> {
        self.connections.snapshot()
    }

    pub fn strategies_snapshot(&self) -> Arc<Vec<Arc<MigrationStrategy>>> {
        self.strategies.snapshot()
    }

    pub fn tasks_snapshot(&self) -> Arc<Vec<Arc<PipelineTask>>> {
        self.tasks.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn connection_by_id(&self, id: &EntityId) -> Option<Arc<ConnectionConfig>> {
        self.connections.get(id)
    }

    pub fn strategy_by_id(&self, id: &EntityId) -> Option<Arc<MigrationStrategy>> {
        self.strategies.get(id)
    }

    pub fn task_by_id(&self, id: &EntityId) -> Option<Arc<PipelineTask>> {
        self.tasks.get(id)
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Mutation counter for the connection collection.
    pub fn connections_version(&self) -> u64 {
        self.connections.version()
    }

    /// Mutation counter for the task collection.
    pub fn tasks_version(&self) -> u64 {
        self.tasks.version()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_connections(&self) -> EntityStream<ConnectionConfig> {
        EntityStream::new(self.connections.subscribe())
    }

    pub fn subscribe_strategies(&self) -> EntityStream<MigrationStrategy> {
        EntityStream::new(self.strategies.subscribe())
    }

    pub fn subscribe_tasks(&self) -> EntityStream<PipelineTask> {
        EntityStream::new(self.tasks.subscribe())
    }

    // ── Refresh timestamps ───────────────────────────────────────────

    pub fn last_connection_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_connection_refresh.borrow()
    }

    pub fn last_task_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_task_refresh.borrow()
    }

    // ── Single-entity mutations ──────────────────────────────────────

    /// Merge a confirmed connection config by id: replace in place or append.
    pub(crate) fn upsert_connection(&self, id: EntityId, config: Arc<ConnectionConfig>) -> bool {
        self.connections.upsert(id, config)
    }

    pub(crate) fn remove_connection(&self, id: &EntityId) -> Option<Arc<ConnectionConfig>> {
        self.connections.remove(id)
    }

    pub(crate) fn upsert_task(&self, task: Arc<PipelineTask>) -> bool {
        self.tasks.upsert(task.id.clone(), task)
    }

    pub(crate) fn upsert_strategy(&self, strategy: Arc<MigrationStrategy>) -> bool {
        self.strategies.upsert(strategy.id.clone(), strategy)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
