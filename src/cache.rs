// src/cache.rs
// Entries are never evicted; staleness is decided on read against the TTL.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Stored document, shaped as `{ "adjustedTotalSupply": "...", "timestamp": 123 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDocument {
    pub adjusted_total_supply: String,
    /// Unix time in milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub contract_address: String,
    pub adjusted_supply: String,
    pub timestamp_ms: i64,
}

impl CacheEntry {
    fn from_document(contract_address: &str, doc: CacheDocument) -> Self {
        Self {
            contract_address: contract_address.to_string(),
            adjusted_supply: doc.adjusted_total_supply,
            timestamp_ms: doc.timestamp,
        }
    }
}

/// Document store holding one collection of cache documents.
#[async_trait]
pub trait SupplyStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<CacheDocument>>;
    async fn set(&self, key: &str, doc: CacheDocument) -> StorageResult<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, CacheDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SupplyStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<CacheDocument>> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(docs.get(key).cloned())
    }

    async fn set(&self, key: &str, doc: CacheDocument) -> StorageResult<()> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;
        docs.insert(key.to_string(), doc);
        Ok(())
    }
}

/// Collections persisted in a single JSON file:
/// `{ "<collection>": { "<key>": <CacheDocument> } }`.
type Collections = HashMap<String, HashMap<String, CacheDocument>>;

/// JSON file backed store. Every write rewrites the file through a temporary
/// sibling and a rename, so readers never see a half-written document.
pub struct FileStore {
    path: PathBuf,
    collection: String,
    // serializes writers sharing the temporary file
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            collection: collection.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn load(&self) -> StorageResult<Collections> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Collections::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Collections::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SupplyStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<CacheDocument>> {
        let mut collections = self.load().await?;
        Ok(collections
            .remove(&self.collection)
            .and_then(|mut docs| docs.remove(key)))
    }

    async fn set(&self, key: &str, doc: CacheDocument) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut collections = self.load().await?;
        collections
            .entry(self.collection.clone())
            .or_default()
            .insert(key.to_string(), doc);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&collections)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Freshness-aware view over a [`SupplyStore`].
pub struct SupplyCache {
    store: Arc<dyn SupplyStore>,
    ttl_ms: i64,
}

impl SupplyCache {
    pub fn new(store: Arc<dyn SupplyStore>, ttl_ms: i64) -> Self {
        Self { store, ttl_ms }
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    pub async fn get(&self, contract_address: &str) -> StorageResult<Option<CacheEntry>> {
        let doc = self.store.get(contract_address).await?;
        Ok(doc.map(|doc| CacheEntry::from_document(contract_address, doc)))
    }

    /// Overwrite the entry for `contract_address`.
    pub async fn put(
        &self,
        contract_address: &str,
        adjusted_supply: &str,
        timestamp_ms: i64,
    ) -> StorageResult<()> {
        debug!(contract_address, timestamp_ms, "writing supply cache entry");
        self.store
            .set(
                contract_address,
                CacheDocument {
                    adjusted_total_supply: adjusted_supply.to_string(),
                    timestamp: timestamp_ms,
                },
            )
            .await
    }

    /// An entry is fresh while `now - timestamp <= ttl`, boundary included.
    pub fn is_fresh(&self, entry: &CacheEntry, now_ms: i64) -> bool {
        now_ms.saturating_sub(entry.timestamp_ms) <= self.ttl_ms
    }
}
