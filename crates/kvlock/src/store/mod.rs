//! Store adapter contract
//!
//! The lock protocol requires exactly three primitives from the backing
//! store, each atomic server-side relative to the key it touches. How an
//! adapter realizes them is its own concern, whether through native
//! conditional commands, server-side scripts, or transactions; the lock
//! calls nothing else.
//!
//! For a Redis-shaped store the mapping is `SET key value PX ttl NX` for
//! [`set_if_absent`](LockStore::set_if_absent) and small compare-then-act
//! scripts for the other two.

use std::time::Duration;

use async_trait::async_trait;

pub mod memory;

/// Failure reported by a store adapter. Carries the adapter's message; the
/// lock wraps it again into the per-operation error before it reaches
/// callers.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The three atomic primitives the lock protocol runs on.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Set `key → value` with expiry `ttl` only if `key` is absent.
    /// Returns whether the set happened.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Delete `key` only if its current value equals `value`.
    /// Returns whether the delete happened.
    async fn delete_if_equal(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Refresh `key`'s expiry to `ttl` only if its current value equals
    /// `value`. Returns whether the refresh happened.
    async fn extend_if_equal(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;
}
