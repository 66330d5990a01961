//! Shared fixtures for the kvlock integration test binaries.

use std::sync::Arc;
use std::time::Duration;

use kvlock::{LockConfig, MemoryLockStore};

/// Fresh in-memory store.
pub fn store() -> Arc<MemoryLockStore> {
    Arc::new(MemoryLockStore::new())
}

/// Config with no retries, so contention fails on the first attempt.
pub fn no_retry_config() -> LockConfig {
    LockConfig {
        retries: 0,
        ..LockConfig::default()
    }
}

/// Config with a short store-side expiry for expiry-race tests.
pub fn short_ttl_config() -> LockConfig {
    LockConfig {
        timeout: Duration::from_millis(100),
        retries: 0,
        ..LockConfig::default()
    }
}
