// ── Generic reactive entity collection ──
//
// Ordered storage keyed by `EntityId` with push-based change notification
// via `watch` channels.

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::EntityId;

/// A reactive collection for a single entity type.
///
/// Entries keep insertion order: replacing an entity keeps its position,
/// new entities are appended, and removal preserves the order of the rest.
/// Every mutation bumps a version counter and rebuilds the snapshot that
/// subscribers receive, both while the write lock is still held so
/// subscribers never observe a half-applied change.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    entries: RwLock<IndexMap<EntityId, Arc<T>>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            entries: RwLock::new(IndexMap::new()),
            version,
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, id: EntityId, entity: Arc<T>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let is_new = entries.insert(id, entity).is_none();
        self.publish(&entries);
        is_new
    }

    /// Remove an entity by id. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.shift_remove(id);
        if removed.is_some() {
            self.publish(&entries);
        }
        removed
    }

    /// Swap the whole collection for `items`, in the given order.
    ///
    /// Subscribers see exactly one change. Later duplicates of an id
    /// overwrite earlier ones in place.
    pub(crate) fn replace_all(&self, items: Vec<(EntityId, Arc<T>)>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *entries = items.into_iter().collect();
        self.publish(&entries);
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of mutations applied so far.
    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Rebuild the snapshot from `entries` and broadcast it, then bump the
    /// version. Called with the write lock held.
    fn publish(&self, entries: &IndexMap<EntityId, Arc<T>>) {
        let values: Vec<Arc<T>> = entries.values().map(Arc::clone).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(s: &str) -> Arc<String> {
        Arc::new(s.to_owned())
    }

    fn values(col: &EntityCollection<String>) -> Vec<String> {
        col.snapshot().iter().map(|s| (**s).clone()).collect()
    }

    #[test]
    fn upsert_returns_true_for_new_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.upsert(EntityId::from("a"), item("hello")));
        assert!(!col.upsert(EntityId::from("a"), item("world")));
        assert_eq!(*col.get(&EntityId::from("a")).unwrap(), "world");
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn replace_keeps_position_and_new_ids_append() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(EntityId::from("a"), item("a1"));
        col.upsert(EntityId::from("b"), item("b1"));
        col.upsert(EntityId::from("a"), item("a2"));
        col.upsert(EntityId::from("c"), item("c1"));

        assert_eq!(values(&col), ["a2", "b1", "c1"]);
    }

    #[test]
    fn remove_preserves_relative_order() {
        let col: EntityCollection<String> = EntityCollection::new();
        for id in ["a", "b", "c"] {
            col.upsert(EntityId::from(id), item(id));
        }

        let removed = col.remove(&EntityId::from("b"));
        assert_eq!(*removed.unwrap(), "b");
        assert_eq!(values(&col), ["a", "c"]);
    }

    #[test]
    fn removing_missing_id_does_not_bump_version() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(EntityId::from("a"), item("a"));
        let before = col.version();

        assert!(col.remove(&EntityId::from("zzz")).is_none());
        assert_eq!(col.version(), before);
    }

    #[test]
    fn replace_all_is_a_single_change() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(EntityId::from("stale"), item("stale"));
        let rx = col.subscribe();
        let before = col.version();

        col.replace_all(vec![
            (EntityId::from("x"), item("x")),
            (EntityId::from("y"), item("y")),
        ]);

        assert_eq!(col.version(), before + 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(values(&col), ["x", "y"]);
        assert!(col.get(&EntityId::from("stale")).is_none());
    }

    #[test]
    fn snapshot_starts_empty() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.is_empty());
        assert!(col.snapshot().is_empty());
        assert_eq!(col.version(), 0);
    }
}
