//! In-process fallback for [`SessionBufferStore`], used when
//! `SESSION_BUFFER_URL` is unset (local dev, tests). Lock-free concurrent
//! access via `DashMap` for per-key state without a global mutex.

use async_trait::async_trait;
use dashmap::DashMap;
use ingestgate_core::error::Result;
use ingestgate_core::ports::SessionBufferStore;

#[derive(Default)]
pub struct InMemorySessionBufferStore {
    buffers: DashMap<String, Vec<String>>,
}

impl InMemorySessionBufferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBufferStore for InMemorySessionBufferStore {
    async fn append(&self, key: &str, chunk: &str) -> Result<()> {
        self.buffers
            .entry(key.to_string())
            .or_default()
            .push(chunk.to_string());
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.buffers.get(key).map(|v| v.clone()).unwrap_or_default())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.buffers.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_then_range_preserves_order() {
        let store = InMemorySessionBufferStore::new();
        store.append("session-1", "hello").await.unwrap();
        store.append("session-1", "world").await.unwrap();
        assert_eq!(store.range("session-1").await.unwrap(), vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn range_on_unknown_key_is_empty() {
        let store = InMemorySessionBufferStore::new();
        assert!(store.range("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_clears_the_buffer() {
        let store = InMemorySessionBufferStore::new();
        store.append("session-1", "hello").await.unwrap();
        store.delete("session-1").await.unwrap();
        assert!(store.range("session-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn buffers_for_different_keys_are_independent() {
        let store = InMemorySessionBufferStore::new();
        store.append("a", "1").await.unwrap();
        store.append("b", "2").await.unwrap();
        assert_eq!(store.range("a").await.unwrap(), vec!["1"]);
        assert_eq!(store.range("b").await.unwrap(), vec!["2"]);
    }
}
