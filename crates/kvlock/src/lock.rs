//! Lock lifecycle state machine
//!
//! A `Lock` is a stateful handle over one key at a time. It starts FREE,
//! moves to HELD on a successful acquire, and returns to FREE on release
//! (whatever the store answers) or on an extend that discovers the key no
//! longer belongs to it. A handle may cycle between the two states
//! indefinitely.
//!
//! Mutual exclusion across processes is adjudicated entirely by the store's
//! atomic conditional primitives; the handle itself needs no in-process
//! locking. The handle's random identity is the only payload ever written,
//! and the conditional delete/extend compare against it so a holder can never
//! affect a key it has lost.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::config::LockConfig;
use crate::error::{AcquisitionError, ExtendError, ReleaseError};
use crate::registry::LockRegistry;
use crate::store::LockStore;

/// Handle for one attempt to hold exclusive access to one key.
pub struct Lock {
    id: String,
    store: Arc<dyn LockStore>,
    registry: LockRegistry,
    config: LockConfig,
    key: Option<String>,
    held: bool,
}

impl Lock {
    /// Build a lock bound to the process-wide registry.
    pub fn new(store: Arc<dyn LockStore>, config: LockConfig) -> Self {
        Self::with_registry(LockRegistry::global(), store, config)
    }

    /// Build a lock publishing into `registry` instead of the process-wide
    /// one.
    pub fn with_registry(
        registry: LockRegistry,
        store: Arc<dyn LockStore>,
        config: LockConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            store,
            registry,
            config: config.sanitized(),
            key: None,
            held: false,
        }
    }

    /// The handle's identity, generated once for its whole lifetime.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The key currently held, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Acquire `key`, retrying up to `config.retries` times with jittered
    /// backoff between attempts. The key is written with `config.timeout` as
    /// its expiry.
    pub async fn acquire(&mut self, key: &str) -> Result<(), AcquisitionError> {
        if self.held {
            return Err(AcquisitionError::AlreadyHeld);
        }

        let mut remaining = self.config.retries;
        loop {
            let set = self
                .store
                .set_if_absent(key, &self.id, self.config.timeout)
                .await?;
            if set {
                break;
            }
            if remaining == 0 {
                return Err(AcquisitionError::Exhausted {
                    key: key.to_string(),
                });
            }
            remaining -= 1;
            tokio::time::sleep(self.config.backoff_delay()).await;
        }

        self.held = true;
        self.key = Some(key.to_string());
        self.registry.register(&self.id, key);
        debug!(key = %key, id = %self.id, "lock acquired");
        Ok(())
    }

    /// Refresh the store-side expiry of the held key; `ttl` defaults to
    /// `config.timeout`. Finding the key gone, or owned by another identity,
    /// resets the handle to FREE and reports the expiry.
    pub async fn extend(&mut self, ttl: Option<Duration>) -> Result<(), ExtendError> {
        if !self.held {
            return Err(ExtendError::NotAcquired);
        }
        let Some(key) = self.key.clone() else {
            return Err(ExtendError::NotAcquired);
        };

        let ttl = ttl.unwrap_or(self.config.timeout);
        let extended = self.store.extend_if_equal(&key, &self.id, ttl).await?;
        if extended {
            debug!(key = %key, id = %self.id, ttl_ms = ttl.as_millis() as u64, "lock extended");
            return Ok(());
        }

        self.forget();
        debug!(key = %key, id = %self.id, "lock expired before extend");
        Err(ExtendError::Expired { key })
    }

    /// Release the held key. Local state is cleared before the store's
    /// answer is inspected, so the handle never stays HELD after a release,
    /// successful or not.
    pub async fn release(&mut self) -> Result<(), ReleaseError> {
        if !self.held {
            return Err(ReleaseError::NotAcquired);
        }
        let Some(key) = self.key.clone() else {
            return Err(ReleaseError::NotAcquired);
        };

        self.forget();

        let deleted = self.store.delete_if_equal(&key, &self.id).await?;
        if !deleted {
            debug!(key = %key, id = %self.id, "lock expired before release");
            return Err(ReleaseError::Expired { key });
        }

        debug!(key = %key, id = %self.id, "lock released");
        Ok(())
    }

    fn forget(&mut self) {
        self.held = false;
        self.key = None;
        self.registry.unregister(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryLockStore;

    fn quick_config() -> LockConfig {
        LockConfig {
            retries: 0,
            ..LockConfig::default()
        }
    }

    fn lock_over(store: &Arc<MemoryLockStore>) -> Lock {
        Lock::with_registry(LockRegistry::new(), store.clone(), quick_config())
    }

    #[tokio::test]
    async fn test_acquire_release_cycle() {
        let store = Arc::new(MemoryLockStore::new());
        let mut lock = lock_over(&store);

        lock.acquire("jobs:nightly").await.unwrap();
        assert!(lock.is_held());
        assert_eq!(lock.key(), Some("jobs:nightly"));

        lock.release().await.unwrap();
        assert!(!lock.is_held());
        assert_eq!(lock.key(), None);

        // The key is reusable across a full lifecycle.
        lock.acquire("jobs:nightly").await.unwrap();
        assert!(lock.is_held());
    }

    #[tokio::test]
    async fn test_acquire_while_held_is_rejected() {
        let store = Arc::new(MemoryLockStore::new());
        let mut lock = lock_over(&store);

        lock.acquire("jobs:nightly").await.unwrap();
        let err = lock.acquire("jobs:other").await.unwrap_err();
        assert!(matches!(err, AcquisitionError::AlreadyHeld));

        // The rejected call left the original claim untouched.
        assert_eq!(lock.key(), Some("jobs:nightly"));
    }

    #[tokio::test]
    async fn test_extend_and_release_require_held() {
        let store = Arc::new(MemoryLockStore::new());
        let mut lock = lock_over(&store);

        assert!(matches!(
            lock.extend(None).await.unwrap_err(),
            ExtendError::NotAcquired
        ));
        assert!(matches!(
            lock.release().await.unwrap_err(),
            ReleaseError::NotAcquired
        ));
    }

    #[tokio::test]
    async fn test_extend_keeps_ownership() {
        let store = Arc::new(MemoryLockStore::new());
        let mut lock = lock_over(&store);

        lock.acquire("jobs:nightly").await.unwrap();
        lock.extend(None).await.unwrap();
        assert!(lock.is_held());
    }

    #[tokio::test]
    async fn test_jitter_clamped_at_construction() {
        let store = Arc::new(MemoryLockStore::new());
        let config = LockConfig {
            jitter: 0.2,
            ..LockConfig::default()
        };
        let lock = Lock::with_registry(LockRegistry::new(), store, config);
        assert_eq!(lock.config().jitter, 1.0);
    }
}
