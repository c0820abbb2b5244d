//! Redis-backed [`SessionBufferStore`] (§4.11): an append-only list per
//! session, TTL refreshed on every write so an abandoned session drains
//! itself instead of living forever.

use std::time::Duration;

use async_trait::async_trait;
use ingestgate_core::error::{Error, Result};
use ingestgate_core::ports::SessionBufferStore;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Ceiling on how long an idle session buffer survives before Redis
/// reclaims it (§4.11: "bounded, not indefinite").
pub const BUFFER_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct RedisSessionBufferStore {
    conn: ConnectionManager,
}

impl RedisSessionBufferStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::StorageUnavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("failed to connect to redis: {e}")))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionBufferStore for RedisSessionBufferStore {
    async fn append(&self, key: &str, chunk: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let () = conn
            .rpush(key, chunk)
            .await
            .map_err(|e| Error::StorageUnavailable(format!("redis append failed: {e}")))?;
        let _: () = conn
            .expire(key, BUFFER_TTL.as_secs() as i64)
            .await
            .map_err(|e| Error::StorageUnavailable(format!("redis expire failed: {e}")))?;
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let values: Vec<String> = conn
            .lrange(key, 0, -1)
            .await
            .map_err(|e| Error::StorageUnavailable(format!("redis range failed: {e}")))?;
        Ok(values)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(key)
            .await
            .map_err(|e| Error::StorageUnavailable(format!("redis delete failed: {e}")))?;
        Ok(())
    }
}
