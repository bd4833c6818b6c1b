//! Per-key FIFO locking
//!
//! Serializes read-modify-write sequences against the same logical file so
//! concurrent requests cannot interleave and lose updates. Keys are the
//! store-relative paths of the documents being mutated.
//!
//! Invariants:
//! - operations on the same key run strictly one at a time, in arrival
//!   order (tokio's `Mutex` grants the lock in FIFO order);
//! - operations on different keys never block each other;
//! - a key's map entry is removed as soon as its queue drains, so the map
//!   only ever holds keys with in-flight work.

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct KeyEntry {
    mutex: tokio::sync::Mutex<()>,
    waiters: AtomicUsize,
}

#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<KeyEntry>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op` while holding the lock for `key`.
    ///
    /// The future is not polled until the lock is held. An `Err` returned
    /// by `op` propagates to the caller; the lock is released either way,
    /// so a failed operation never wedges the queue behind it.
    pub async fn with_lock<F: Future>(&self, key: &str, op: F) -> F::Output {
        let entry = {
            let e = self
                .locks
                .entry(key.to_string())
                .or_insert_with(Default::default);
            e.value().waiters.fetch_add(1, Ordering::SeqCst);
            Arc::clone(e.value())
        };
        let _waiter = WaiterGuard {
            locks: &self.locks,
            key,
            entry: &entry,
        };

        let _held = entry.mutex.lock().await;
        op.await
    }

    /// Number of keys with queued or running operations.
    pub fn live_keys(&self) -> usize {
        self.locks.len()
    }
}

/// Decrements the waiter count on the way out (normal return or drop) and
/// removes the map entry once the queue is empty. The re-check inside
/// `remove_if` runs under the shard lock, so a late arrival that bumped the
/// count again keeps the entry alive.
struct WaiterGuard<'a> {
    locks: &'a DashMap<String, Arc<KeyEntry>>,
    key: &'a str,
    entry: &'a Arc<KeyEntry>,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        if self.entry.waiters.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.locks
                .remove_if(self.key, |_, e| e.waiters.load(Ordering::SeqCst) == 0);
        }
    }
}
