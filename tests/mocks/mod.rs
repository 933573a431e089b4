use async_trait::async_trait;
use circulating_supply_api::cache::{CacheDocument, MemoryStore, SupplyStore};
use circulating_supply_api::error::{RpcError, RpcResult, StorageError, StorageResult};
use circulating_supply_api::service::Clock;
use circulating_supply_api::supply::SupplyReader;
use ethers::types::{Address, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory token contract that counts the calls made against it.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockReader {
    total_supply: Arc<Mutex<U256>>,
    balances: Arc<Mutex<HashMap<Address, U256>>>,
    failing: Arc<Mutex<Vec<Address>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
}

#[allow(dead_code)]
impl MockReader {
    pub fn new(total_supply: U256) -> Self {
        let reader = Self::default();
        *reader.total_supply.lock().unwrap() = total_supply;
        reader
    }

    pub fn set_total_supply(&self, value: U256) {
        *self.total_supply.lock().unwrap() = value;
    }

    pub fn set_balance(&self, owner: Address, value: U256) {
        self.balances.lock().unwrap().insert(owner, value);
    }

    /// Make `balanceOf(owner)` fail with an RPC error.
    pub fn fail_balance_of(&self, owner: Address) {
        self.failing.lock().unwrap().push(owner);
    }

    pub fn get_call_count(&self, method: &str) -> usize {
        *self.call_counts.lock().unwrap().get(method).unwrap_or(&0)
    }

    pub fn total_calls(&self) -> usize {
        self.call_counts.lock().unwrap().values().sum()
    }

    fn track_call(&self, method: &str) {
        *self
            .call_counts
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_insert(0) += 1;
    }
}

#[async_trait]
impl SupplyReader for MockReader {
    async fn total_supply(&self) -> RpcResult<U256> {
        self.track_call("total_supply");
        Ok(*self.total_supply.lock().unwrap())
    }

    async fn balance_of(&self, owner: Address) -> RpcResult<U256> {
        self.track_call("balance_of");
        if self.failing.lock().unwrap().contains(&owner) {
            return Err(RpcError::Call {
                call: format!("balanceOf({:?})", owner),
                message: "execution reverted".to_string(),
            });
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&owner)
            .copied()
            .unwrap_or_default())
    }
}

/// Store wrapper whose reads and writes can be switched off.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<MemoryStore>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<Mutex<usize>>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub async fn seed(&self, key: &str, supply: &str, timestamp: i64) {
        self.inner
            .set(
                key,
                CacheDocument {
                    adjusted_total_supply: supply.to_string(),
                    timestamp,
                },
            )
            .await
            .unwrap();
    }

    pub async fn document(&self, key: &str) -> Option<CacheDocument> {
        self.inner.get(key).await.unwrap()
    }
}

#[async_trait]
impl SupplyStore for MockStore {
    async fn get(&self, key: &str) -> StorageResult<Option<CacheDocument>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("store offline".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, doc: CacheDocument) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("store offline".to_string()));
        }
        *self.writes.lock().unwrap() += 1;
        self.inner.set(key, doc).await
    }
}

/// Manually advanced clock.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockClock {
    now_ms: Arc<AtomicI64>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(now_ms)),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
