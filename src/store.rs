//! # Continuation Store
//!
//! Key-value persistence for serialized cursors, keyed by the continuation
//! id the timer registrar minted. Each id is written by exactly one logical
//! run, so last-writer-wins per key is the only coordination the backend
//! must provide.
//!
//! The store is an injected collaborator: production code wraps the host's
//! property store, tests use [`InMemoryContinuationStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::constants::DEFAULT_STORE_NAMESPACE;
use crate::cursor::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ContinuationStore: Send + Sync {
    /// Persist `cursor` under `id`, replacing any previous value.
    async fn put(&self, id: &str, cursor: &Cursor) -> Result<(), StoreError>;

    /// Read the cursor stored under `id`, if any.
    async fn get(&self, id: &str) -> Result<Option<Cursor>, StoreError>;

    /// Remove the record under `id`. Removing an absent id is not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// In-memory store for testing and local development. Records are held as
/// JSON text under a namespace-prefixed key, the same shape a host property
/// store would see.
pub struct InMemoryContinuationStore {
    namespace: String,
    entries: RwLock<HashMap<String, String>>,
}

impl Default for InMemoryContinuationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContinuationStore {
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_STORE_NAMESPACE)
    }

    /// Use a distinct key prefix, isolating this deployment's records from
    /// others sharing the same backing store.
    pub fn with_namespace<S: Into<String>>(namespace: S) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn key(&self, id: &str) -> String {
        format!("{}/{}", self.namespace, id)
    }

    /// Number of outstanding records. Test observability only.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ContinuationStore for InMemoryContinuationStore {
    async fn put(&self, id: &str, cursor: &Cursor) -> Result<(), StoreError> {
        let text = serde_json::to_string(cursor)?;
        self.entries.write().await.insert(self.key(id), text);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Cursor>, StoreError> {
        let entries = self.entries.read().await;
        match entries.get(&self.key(id)) {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(&self.key(id));
        Ok(())
    }
}
