// ── Cache subscriptions ──
//
// A view layer listing connection configs or pipeline tasks holds an
// `EntityStream` and re-renders on each snapshot. Each successful cache
// mutation publishes exactly one new snapshot; failed backend calls
// publish nothing. Dropping the handle is the unsubscribe.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// An ordered, shared snapshot of one cached collection.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// Live handle on one cached collection (connections, strategies or tasks).
pub struct EntityStream<T: Send + Sync + 'static> {
    seen: Snapshot<T>,
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot<T>>) -> Self {
        let seen = Arc::clone(&receiver.borrow());
        Self { seen, receiver }
    }

    /// Collection contents at subscribe time, advanced by each `changed()`.
    pub fn current(&self) -> &Snapshot<T> {
        &self.seen
    }

    /// Whatever the cache holds right now, without marking it seen.
    pub fn latest(&self) -> Snapshot<T> {
        Arc::clone(&self.receiver.borrow())
    }

    /// Next snapshot published after the one last seen.
    ///
    /// `None` once the owning store is gone.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        if self.receiver.changed().await.is_err() {
            return None;
        }
        self.seen = Arc::clone(&self.receiver.borrow_and_update());
        Some(Arc::clone(&self.seen))
    }

    /// Yields the current contents first, then every later snapshot.
    pub fn into_stream(self) -> EntityWatchStream<T> {
        EntityWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

pub struct EntityWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> Stream for EntityWatchStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
