//! kvlock: client-side mutual-exclusion locks over an atomic key-value store
//!
//! This crate provides:
//! - [`Lock`]: the acquire/extend/release lifecycle against any [`LockStore`]
//! - [`LockRegistry`]: process-wide introspection of currently-held locks
//! - [`MemoryLockStore`]: in-process store for tests and single-process use
//!
//! Ownership of a key is adjudicated entirely by the store's three atomic
//! conditional primitives; no client-side locking is involved. The usual
//! single-instance-lock caveats apply: a holder that stalls past its TTL
//! without renewing loses the mutual-exclusion guarantee, and a store that
//! serves stale data voids it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use kvlock::{create_lock, LockConfig, MemoryLockStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryLockStore::new());
//! let mut lock = create_lock(store, LockConfig::default());
//!
//! lock.acquire("jobs:nightly").await?;
//! // ... exclusive work, renewing as needed ...
//! lock.extend(None).await?;
//! lock.release().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod lock;
pub mod registry;
pub mod store;

pub use config::LockConfig;
pub use error::{AcquisitionError, ExtendError, ReleaseError};
pub use lock::Lock;
pub use registry::{HeldLock, LockRegistry};
pub use store::memory::MemoryLockStore;
pub use store::{LockStore, StoreError};

use std::sync::Arc;

/// Build a [`Lock`] bound to the process-wide registry.
pub fn create_lock(store: Arc<dyn LockStore>, config: LockConfig) -> Lock {
    Lock::new(store, config)
}

/// Build a [`Lock`] publishing into `registry` instead of the process-wide
/// one. Tests use this to avoid shared global state.
pub fn create_lock_in(
    registry: LockRegistry,
    store: Arc<dyn LockStore>,
    config: LockConfig,
) -> Lock {
    Lock::with_registry(registry, store, config)
}

/// Snapshot of every lock currently held through the process-wide registry.
pub fn acquired_locks() -> Vec<HeldLock> {
    LockRegistry::global().list()
}
