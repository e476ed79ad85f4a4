//! Redis-backed slot lock store.
//!
//! `SET key value NX PX ttl` is the single atomic conditional-set the
//! mutual-exclusion guarantee rests on: the existence check and the write
//! happen in one server-side step, with the expiry attached in the same
//! command. Keys carry an opaque per-holder token; release is an
//! unconditional best-effort `DEL`, with the TTL as backstop.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::{RedisConnectionManager, bb8, redis};
use rand::RngCore;

use crate::domain::ports::{SlotLockError, SlotLockStore};

/// Slot lock store backed by a pooled Redis connection.
#[derive(Clone)]
pub struct RedisSlotLockStore {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisSlotLockStore {
    /// Connect a pooled lock store to the given Redis URL.
    pub async fn connect(redis_url: &str) -> Result<Self, SlotLockError> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(|err| SlotLockError::backend(format!("invalid redis url: {err}")))?;
        let pool = bb8::Pool::builder()
            .build(manager)
            .await
            .map_err(|err| SlotLockError::backend(format!("redis pool build failed: {err}")))?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, SlotLockError> {
        self.pool
            .get()
            .await
            .map_err(|err| SlotLockError::backend(format!("redis checkout failed: {err}")))
    }
}

/// Opaque value identifying one lock holder.
fn holder_token() -> String {
    let mut bytes = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl SlotLockStore for RedisSlotLockStore {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool, SlotLockError> {
        let mut conn = self.connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(holder_token())
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(|err| SlotLockError::backend(format!("redis SET failed: {err}")))?;
        // NX replies OK when the key was set and Nil when it already exists.
        Ok(reply.is_some())
    }

    async fn release(&self, key: &str) -> Result<(), SlotLockError> {
        let mut conn = self.connection().await?;
        let _removed: u64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut *conn)
            .await
            .map_err(|err| SlotLockError::backend(format!("redis DEL failed: {err}")))?;
        Ok(())
    }
}
