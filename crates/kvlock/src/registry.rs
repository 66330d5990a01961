//! Process-wide tracking of held locks
//!
//! Every successful acquisition publishes a snapshot row here; release, or an
//! extend that discovers lost ownership, withdraws it. The registry exists
//! for introspection only and has no say in the lock protocol itself. Locks
//! take an injected registry, so tests can use isolated instances instead of
//! the process-wide default.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use serde::Serialize;

/// Snapshot row for one currently-held lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeldLock {
    /// Identity of the holding [`Lock`](crate::Lock) handle.
    pub id: String,
    /// Key the handle currently holds.
    pub key: String,
}

/// Concurrency-safe set of currently-held locks, keyed by lock identity.
#[derive(Clone, Default)]
pub struct LockRegistry {
    inner: Arc<DashMap<String, HeldLock>>,
}

static GLOBAL: LazyLock<LockRegistry> = LazyLock::new(LockRegistry::new);

impl LockRegistry {
    /// An isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub(crate) fn register(&self, id: &str, key: &str) {
        self.inner.insert(
            id.to_string(),
            HeldLock {
                id: id.to_string(),
                key: key.to_string(),
            },
        );
    }

    pub(crate) fn unregister(&self, id: &str) {
        self.inner.remove(id);
    }

    /// Snapshot of the currently-held locks. Copies out of the live set, so
    /// it is safe to call while other tasks acquire and release.
    pub fn list(&self) -> Vec<HeldLock> {
        self.inner.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
