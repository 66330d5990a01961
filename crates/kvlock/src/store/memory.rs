//! In-memory lock store
//!
//! Single-process implementation of [`LockStore`] backed by a `DashMap`.
//! Entries expire lazily: every operation treats an expired entry as absent.
//! Used by the test suites and as the reference implementation of the
//! adapter contract.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::time::Instant;
use tracing::debug;

use super::{LockStore, StoreError};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory [`LockStore`] with millisecond TTL semantics.
#[derive(Default)]
pub struct MemoryLockStore {
    entries: DashMap<String, Entry>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining TTL of a live entry, `None` if absent or expired.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.expires_at - Instant::now())
    }

    /// Unconditional overwrite, bypassing the conditional primitives.
    /// Simulates another writer taking the key out from under a holder.
    pub fn put_unchecked(&self, key: &str, value: &str, ttl: Duration) {
        self.entries.insert(key.to_string(), Entry::new(value, ttl));
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        // The entry API keeps the check-and-insert atomic against other callers.
        let set = match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) if occupied.get().is_expired() => {
                occupied.insert(Entry::new(value, ttl));
                true
            }
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(value, ttl));
                true
            }
        };

        if set {
            debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "key set");
        }
        Ok(set)
    }

    async fn delete_if_equal(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let removed = self
            .entries
            .remove_if(key, |_, entry| !entry.is_expired() && entry.value == value);

        if removed.is_some() {
            debug!(key = %key, "key deleted");
        }
        Ok(removed.is_some())
    }

    async fn extend_if_equal(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        if let Some(mut entry) = self.entries.get_mut(key)
            && !entry.is_expired()
            && entry.value == value
        {
            entry.expires_at = Instant::now() + ttl;
            debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "key expiry refreshed");
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(60_000);

    #[tokio::test]
    async fn test_set_if_absent_rejects_live_key() {
        let store = MemoryLockStore::new();

        assert!(store.set_if_absent("key1", "a", TTL).await.unwrap());
        assert!(!store.set_if_absent("key1", "b", TTL).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_if_absent_replaces_expired_key() {
        let store = MemoryLockStore::new();

        assert!(
            store
                .set_if_absent("key1", "a", Duration::from_millis(100))
                .await
                .unwrap()
        );
        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(store.set_if_absent("key1", "b", TTL).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_if_equal_checks_value() {
        let store = MemoryLockStore::new();
        store.set_if_absent("key1", "a", TTL).await.unwrap();

        assert!(!store.delete_if_equal("key1", "b").await.unwrap());
        assert!(store.delete_if_equal("key1", "a").await.unwrap());
        assert!(!store.delete_if_equal("key1", "a").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_extend_if_equal_refreshes_ttl() {
        let store = MemoryLockStore::new();
        store
            .set_if_absent("key1", "a", Duration::from_millis(10_000))
            .await
            .unwrap();

        assert!(
            store
                .extend_if_equal("key1", "a", Duration::from_millis(30_000))
                .await
                .unwrap()
        );
        assert_eq!(store.ttl("key1"), Some(Duration::from_millis(30_000)));

        assert!(
            !store
                .extend_if_equal("key1", "b", Duration::from_millis(30_000))
                .await
                .unwrap()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_key_is_absent() {
        let store = MemoryLockStore::new();
        store
            .set_if_absent("key1", "a", Duration::from_millis(100))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_millis(200)).await;

        assert_eq!(store.ttl("key1"), None);
        assert!(store.is_empty());
        assert!(!store.delete_if_equal("key1", "a").await.unwrap());
        assert!(!store.extend_if_equal("key1", "a", TTL).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_unchecked_overwrites() {
        let store = MemoryLockStore::new();
        store.set_if_absent("key1", "a", TTL).await.unwrap();

        store.put_unchecked("key1", "thief", TTL);
        assert!(!store.delete_if_equal("key1", "a").await.unwrap());
        assert!(store.delete_if_equal("key1", "thief").await.unwrap());
    }
}
