//! §4.11 Session Buffer Store: an append-only, TTL-bounded log of live
//! transcript chunks keyed by session id, backed by Redis in production
//! and an in-process `DashMap` when `SESSION_BUFFER_URL` is unset.

pub mod memory;
pub mod redis_store;

pub use memory::InMemorySessionBufferStore;
pub use redis_store::{RedisSessionBufferStore, BUFFER_TTL};

use std::sync::Arc;

use ingestgate_core::ports::SessionBufferStore;

/// Build the configured store: Redis if `SESSION_BUFFER_URL` is set, the
/// in-memory fallback otherwise (single-process dev/test deployments).
pub async fn build_from_env() -> Arc<dyn SessionBufferStore> {
    match std::env::var("SESSION_BUFFER_URL") {
        Ok(url) if !url.is_empty() => match RedisSessionBufferStore::connect(&url).await {
            Ok(store) => Arc::new(store),
            Err(err) => {
                tracing::warn!(error = %err, "falling back to in-memory session buffer store");
                Arc::new(InMemorySessionBufferStore::new())
            }
        },
        _ => Arc::new(InMemorySessionBufferStore::new()),
    }
}
