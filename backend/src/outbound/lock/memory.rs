//! In-memory slot lock store.
//!
//! Thread-safe twin of the Redis adapter for tests and single-process
//! deployments. One mutex guard covers the existence check and the write,
//! giving the same atomic conditional-set the contract requires; expiry
//! uses a monotonic clock so wall-clock adjustments cannot revive or
//! extend a lock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::ports::{SlotLockError, SlotLockStore};

/// Slot lock store held in process memory.
#[derive(Debug, Default)]
pub struct MemorySlotLockStore {
    deadlines: Mutex<HashMap<String, Instant>>,
}

impl MemorySlotLockStore {
    /// Create an empty lock store.
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Instant>>, SlotLockError> {
        self.deadlines
            .lock()
            .map_err(|_| SlotLockError::backend("lock table poisoned"))
    }
}

#[async_trait]
impl SlotLockStore for MemorySlotLockStore {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool, SlotLockError> {
        let now = Instant::now();
        let mut deadlines = self.guard()?;
        if deadlines.get(key).is_some_and(|deadline| *deadline > now) {
            return Ok(false);
        }
        deadlines.insert(key.to_owned(), now + ttl);
        Ok(true)
    }

    async fn release(&self, key: &str) -> Result<(), SlotLockError> {
        self.guard()?.remove(key);
        Ok(())
    }
}
