//! Driven port for the distributed slot lock store.
//!
//! The lock gives at-most-one-writer semantics per (doctor, slot start)
//! key. Correctness rests on `try_acquire` being a single atomic
//! conditional-set at the storage layer; adapters must never implement it
//! as a separate read followed by a write.

use std::time::Duration;

use async_trait::async_trait;

/// Errors raised by slot lock adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotLockError {
    /// The lock store is unreachable or timing out.
    #[error("slot lock store failure: {message}")]
    Backend {
        /// Adapter-level description of the failure.
        message: String,
    },
}

impl SlotLockError {
    /// Create a backend error with the given message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Port for the short-lived mutual-exclusion lock keyed by slot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlotLockStore: Send + Sync {
    /// Atomically set `key` only if absent, expiring after `ttl`.
    ///
    /// Returns `true` iff this caller now holds the lock. A held key makes
    /// this return `false`; it is not an error. An unreachable store is an
    /// error and must never be reported as an acquired lock.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool, SlotLockError>;

    /// Best-effort removal of `key`.
    ///
    /// Safe to call when the lock already expired or was never held; the
    /// TTL remains the backstop when release itself fails.
    async fn release(&self, key: &str) -> Result<(), SlotLockError>;
}
