use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::types::{DocumentStore, StoreError};

#[derive(Default)]
struct Inner {
    docs: HashMap<(String, String), Value>,
    fail_keys: HashSet<String>,
    puts: usize,
}

/// In-process [`DocumentStore`] used for `--dry-run` and in tests.
///
/// Clones share the same map. Keys registered with [`fail_key`](Self::fail_key)
/// reject every write, which lets callers exercise the write-failure path.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future `put` to `key` fail with [`StoreError::Rejected`].
    pub async fn fail_key(&self, key: &str) {
        self.inner.lock().await.fail_keys.insert(key.to_string());
    }

    /// Total number of `put` calls seen, including rejected ones.
    pub async fn put_calls(&self) -> usize {
        self.inner.lock().await.puts
    }

    /// All keys stored in `collection`, sorted.
    pub async fn keys(&self, collection: &str) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut keys: Vec<String> = inner
            .docs
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.puts += 1;

        if inner.fail_keys.contains(key) {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        inner
            .docs
            .insert((collection.to_string(), key.to_string()), body.clone());
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .docs
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.docs.keys().filter(|(c, _)| c == collection).count())
    }
}
