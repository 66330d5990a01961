//! Error types for lock operations
//!
//! One error kind per operation family. Store-level failures are never
//! surfaced raw: each operation wraps them into its own kind, so callers can
//! match on the operation regardless of the backing store's error shape.
//! Precondition violations are reported before any store call is made.

use crate::store::StoreError;

/// Errors returned by [`Lock::acquire`](crate::Lock::acquire).
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// The handle already holds a key; no store call was made.
    #[error("Lock already held")]
    AlreadyHeld,

    /// Every attempt found the key taken by another holder.
    #[error("Could not acquire lock on \"{key}\"")]
    Exhausted { key: String },

    /// The store failed mid-attempt; carries the original message.
    #[error("{0}")]
    Store(String),
}

/// Errors returned by [`Lock::extend`](crate::Lock::extend).
#[derive(Debug, thiserror::Error)]
pub enum ExtendError {
    /// The handle holds nothing; no store call was made.
    #[error("Lock has not been acquired")]
    NotAcquired,

    /// The key no longer maps to this handle's identity. The handle has been
    /// reset to FREE and may re-acquire.
    #[error("Lock on \"{key}\" had expired")]
    Expired { key: String },

    #[error("{0}")]
    Store(String),
}

/// Errors returned by [`Lock::release`](crate::Lock::release).
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// The handle holds nothing; no store call was made.
    #[error("Lock has not been acquired")]
    NotAcquired,

    /// The key had already expired or been taken by another holder. Local
    /// state was cleared regardless.
    #[error("Lock on \"{key}\" had expired")]
    Expired { key: String },

    #[error("{0}")]
    Store(String),
}

impl From<StoreError> for AcquisitionError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<StoreError> for ExtendError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<StoreError> for ReleaseError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}
