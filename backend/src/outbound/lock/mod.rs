//! Slot lock store adapters.

mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{SlotLockError, SlotLockStore};

pub use memory::MemorySlotLockStore;
pub use redis::RedisSlotLockStore;

/// Runtime-selected lock store.
///
/// Redis when configured; otherwise the in-process store, which upholds the
/// booking invariant only within a single service instance.
pub enum AnySlotLockStore {
    /// Redis-backed store shared across instances.
    Redis(RedisSlotLockStore),
    /// In-process store for tests and single-instance deployments.
    Memory(MemorySlotLockStore),
}

#[async_trait]
impl SlotLockStore for AnySlotLockStore {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool, SlotLockError> {
        match self {
            Self::Redis(store) => store.try_acquire(key, ttl).await,
            Self::Memory(store) => store.try_acquire(key, ttl).await,
        }
    }

    async fn release(&self, key: &str) -> Result<(), SlotLockError> {
        match self {
            Self::Redis(store) => store.release(key).await,
            Self::Memory(store) => store.release(key).await,
        }
    }
}
