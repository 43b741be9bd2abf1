//! Per-entity write serialization.
//!
//! The store offers no atomic array-append, so append-type mutations
//! (reviews, comments, likes) perform a read-modify-write. Two concurrent
//! cycles against the same document would silently drop one append; holding
//! a per-entity async mutex across the cycle prevents that. The registry is
//! keyed by document id and bounded by the number of entities mutated over
//! the process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-entity async mutexes.
#[derive(Debug, Default)]
pub struct EntityLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl EntityLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one entity, waiting if another cycle holds it.
    ///
    /// The guard must be held across the whole read-modify-write cycle.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = match self.inner.lock() {
                Ok(guard) => guard,
                // A poisoned registry only means another thread panicked
                // while inserting; the map itself is still usable.
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(map.entry(key.to_owned()).or_default())
        };
        lock.lock_owned().await
    }
}
