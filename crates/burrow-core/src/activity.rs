//! The "operation in flight" indicator.
//!
//! Every suspension at the File System Service boundary holds an
//! [`ActivityGuard`]. The number of live guards is published through a
//! `tokio::sync::watch` channel so the presentation can disable controls
//! while a request is pending, even though the caller is awaiting it.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared counter of in-flight service requests.
#[derive(Debug, Clone)]
pub struct Activity {
    tx: Arc<watch::Sender<usize>>,
}

impl Activity {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Marks one request as in flight until the returned guard is dropped.
    pub fn begin(&self) -> ActivityGuard {
        self.tx.send_modify(|n| *n += 1);
        ActivityGuard {
            tx: Arc::clone(&self.tx),
        }
    }

    /// Returns `true` while at least one request is pending.
    pub fn in_flight(&self) -> bool {
        *self.tx.borrow() > 0
    }

    /// Subscribes to changes of the pending-request count.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.tx.subscribe()
    }
}

impl Default for Activity {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the activity counter raised while alive.
#[derive(Debug)]
#[must_use = "the request is only counted while the guard is alive"]
pub struct ActivityGuard {
    tx: Arc<watch::Sender<usize>>,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.tx.send_modify(|n| *n = n.saturating_sub(1));
    }
}
