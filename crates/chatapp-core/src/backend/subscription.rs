//! Live subscription handles and the subscriber registry behind them.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;

type CancelFn = Box<dyn FnOnce() + Send>;

/// Handle to a live query or document watch.
///
/// Each value received is the complete current result of the watched query.
/// The first snapshot is delivered as soon as the watch is established.
/// Cancelling (or dropping) the handle unregisters the backend listener.
pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    cancel: Option<CancelFn>,
}

impl<T> Subscription<T> {
    /// Wrap a snapshot channel with the callback that tears the listener down
    pub fn new(
        receiver: mpsc::UnboundedReceiver<T>,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Wait for the next snapshot. `None` once the source has gone away.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take the next snapshot if one is already queued
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Drain queued snapshots and return the newest one
    pub fn latest(&mut self) -> Option<T> {
        let mut latest = None;
        while let Ok(snapshot) = self.receiver.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }

    /// Unregister the listener
    pub fn cancel(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
        self.receiver.close();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

/// Registry of in-process listeners keyed by what they watch.
///
/// `publish` recomputes every listener's snapshot and pushes it only when it
/// differs from the last one that listener received.
pub(crate) struct Subscribers<K, T> {
    inner: Arc<Mutex<Registry<K, T>>>,
}

struct Registry<K, T> {
    next_id: u64,
    entries: Vec<Entry<K, T>>,
}

struct Entry<K, T> {
    id: u64,
    key: K,
    last: T,
    sender: mpsc::UnboundedSender<T>,
}

impl<K, T> Clone for Subscribers<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, T> Default for Subscribers<K, T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<K, T> Subscribers<K, T>
where
    K: Send + 'static,
    T: Clone + PartialEq + Send + 'static,
{
    pub fn subscribe(&self, key: K, initial: T) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        // The receiver is still in scope, so this send cannot fail.
        let _ = sender.send(initial.clone());

        let id = {
            let mut registry = lock(&self.inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push(Entry {
                id,
                key,
                last: initial,
                sender,
            });
            id
        };

        let registry = Arc::downgrade(&self.inner);
        Subscription::new(receiver, move || remove(&registry, id))
    }

    pub fn publish(&self, mut snapshot: impl FnMut(&K) -> T) {
        lock(&self.inner).entries.retain_mut(|entry| {
            let current = snapshot(&entry.key);
            if current == entry.last {
                return !entry.sender.is_closed();
            }
            entry.last = current.clone();
            entry.sender.send(current).is_ok()
        });
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }
}

fn remove<K, T>(registry: &Weak<Mutex<Registry<K, T>>>, id: u64) {
    if let Some(registry) = registry.upgrade() {
        lock(&registry).entries.retain(|entry| entry.id != id);
    }
}

fn lock<K, T>(registry: &Mutex<Registry<K, T>>) -> MutexGuard<'_, Registry<K, T>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
