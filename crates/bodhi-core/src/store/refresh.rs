// ── Full refresh application logic ──
//
// Applies full backend listings to the DataStore. A listing replaces the
// collection wholesale, in backend order, as one change.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::DataStore;
use crate::model::{ConnectionConfig, EntityId, PipelineTask};

impl DataStore {
    /// Replace every cached connection config with a backend listing.
    ///
    /// Entries without an id cannot be keyed and are skipped. Returns the
    /// number of configs now cached.
    pub(crate) fn apply_connection_listing(&self, configs: Vec<ConnectionConfig>) -> usize {
        let items: Vec<(EntityId, Arc<ConnectionConfig>)> = configs
            .into_iter()
            .filter_map(|config| match config.id.clone() {
                Some(id) if !id.is_empty() => Some((id, Arc::new(config))),
                _ => {
                    warn!(name = %config.name, "skipping listed connection config without an id");
                    None
                }
            })
            .collect();

        self.connections.replace_all(items);
        self.last_connection_refresh.send_replace(Some(Utc::now()));

        let count = self.connections.len();
        debug!(count, "connection listing applied");
        count
    }

    /// Replace every cached pipeline task with a backend listing.
    pub(crate) fn apply_task_listing(&self, tasks: Vec<PipelineTask>) -> usize {
        let items: Vec<(EntityId, Arc<PipelineTask>)> = tasks
            .into_iter()
            .map(|task| (task.id.clone(), Arc::new(task)))
            .collect();

        self.tasks.replace_all(items);
        self.last_task_refresh.send_replace(Some(Utc::now()));

        let count = self.tasks.len();
        debug!(count, "task listing applied");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DatabaseType;

    fn config(id: Option<&str>, name: &str) -> ConnectionConfig {
        let mut c = ConnectionConfig::new(name, DatabaseType::MySql);
        c.id = id.map(EntityId::from);
        c
    }

    #[test]
    fn listing_replaces_everything_in_backend_order() {
        let store = DataStore::new();
        store.apply_connection_listing(vec![config(Some("old"), "old")]);

        let count = store.apply_connection_listing(vec![
            config(Some("b"), "second"),
            config(Some("a"), "first"),
        ]);

        assert_eq!(count, 2);
        let names: Vec<String> = store
            .connections_snapshot()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, ["second", "first"]);
        assert!(store.connection_by_id(&EntityId::from("old")).is_none());
        assert!(store.last_connection_refresh().is_some());
    }

    #[test]
    fn listing_skips_entries_without_id() {
        let store = DataStore::new();
        let count = store.apply_connection_listing(vec![
            config(None, "orphan"),
            config(Some(""), "blank"),
            config(Some("ok"), "kept"),
        ]);
        assert_eq!(count, 1);
    }

    #[test]
    fn listing_is_one_change() {
        let store = DataStore::new();
        let before = store.connections_version();
        store.apply_connection_listing(vec![config(Some("a"), "a"), config(Some("b"), "b")]);
        assert_eq!(store.connections_version(), before + 1);
    }
}
