//! Concurrent read-modify-write on a single user's inventory.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use foodsage_inventory::{InventoryConfig, InventoryEngine, InventoryError};
use foodsage_storage::{
    InventoryRecord, InventoryStorage, MemoryStorage, StorageError, StorageResult,
};
use tokio::sync::{Barrier, Mutex};

/// Store wrapper that holds the first `gated` reads until all of them have
/// happened, forcing the readers to interleave before anyone writes.
struct InterleavingStore {
    inner: MemoryStorage,
    barrier: Barrier,
    gated: usize,
    reads: AtomicUsize,
    puts: AtomicUsize,
}

impl InterleavingStore {
    fn new(gated: usize) -> Self {
        Self {
            inner: MemoryStorage::new(),
            barrier: Barrier::new(gated),
            gated,
            reads: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl InventoryStorage for InterleavingStore {
    async fn get(&self, user_id: &str) -> StorageResult<Option<InventoryRecord>> {
        let record = self.inner.get(user_id).await?;
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.gated {
            self.barrier.wait().await;
        }
        Ok(record)
    }

    async fn put(
        &self,
        user_id: &str,
        items: &BTreeSet<String>,
        expected: Option<u64>,
    ) -> StorageResult<InventoryRecord> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(user_id, items, expected).await
    }

    async fn delete(&self, user_id: &str, expected: u64) -> StorageResult<()> {
        self.inner.delete(user_id, expected).await
    }
}

/// Store whose writes always lose.
struct AlwaysConflicting {
    puts: AtomicUsize,
}

#[async_trait]
impl InventoryStorage for AlwaysConflicting {
    async fn get(&self, _user_id: &str) -> StorageResult<Option<InventoryRecord>> {
        Ok(None)
    }

    async fn put(
        &self,
        _user_id: &str,
        _items: &BTreeSet<String>,
        expected: Option<u64>,
    ) -> StorageResult<InventoryRecord> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::version_conflict(expected, Some(99)))
    }

    async fn delete(&self, _user_id: &str, expected: u64) -> StorageResult<()> {
        Err(StorageError::version_conflict(Some(expected), Some(99)))
    }
}

fn fast_config(max_attempts: u32) -> InventoryConfig {
    InventoryConfig {
        max_attempts,
        backoff_base_ms: 1,
        backoff_max_ms: 5,
    }
}

#[tokio::test]
async fn naive_read_modify_write_loses_an_update() {
    // Read the set, wait until the other writer has read too, then
    // overwrite unconditionally.
    let table: Arc<Mutex<HashMap<String, BTreeSet<String>>>> = Arc::default();
    let barrier = Arc::new(Barrier::new(2));

    let naive_add = |item: &'static str| {
        let table = table.clone();
        let barrier = barrier.clone();
        tokio::spawn(async move {
            let mut items = table.lock().await.get("u1").cloned().unwrap_or_default();
            barrier.wait().await;
            items.insert(item.to_string());
            table.lock().await.insert("u1".to_string(), items);
        })
    };

    let a = naive_add("eggs");
    let b = naive_add("milk");
    a.await.unwrap();
    b.await.unwrap();

    let final_items = table.lock().await.get("u1").cloned().unwrap();
    assert_eq!(final_items.len(), 1, "one of the two adds was lost");
}

#[tokio::test]
async fn concurrent_adds_on_empty_inventory_both_land() {
    let store = Arc::new(InterleavingStore::new(2));
    let engine = InventoryEngine::new(store.clone(), fast_config(8));

    let (eggs, milk) = tokio::join!(engine.add_item("u1", "eggs"), engine.add_item("u1", "milk"));
    eggs.unwrap();
    milk.unwrap();

    assert_eq!(engine.get_inventory("u1").await.unwrap(), vec!["eggs", "milk"]);
    // Both first writes expected an absent record; exactly one lost and retried.
    assert_eq!(store.puts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn concurrent_duplicate_adds_yield_one_conflict() {
    let store = Arc::new(InterleavingStore::new(2));
    let engine = InventoryEngine::new(store, fast_config(8));

    let (a, b) = tokio::join!(engine.add_item("u1", "milk"), engine.add_item("u1", "milk"));

    let results = [a, b];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(InventoryError::ItemExists { .. })))
        .count();
    assert_eq!((ok, conflicts), (1, 1));
    assert_eq!(engine.get_inventory("u1").await.unwrap(), vec!["milk"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_writers_lose_nothing() {
    let storage = MemoryStorage::new();
    let engine = InventoryEngine::new(Arc::new(storage), fast_config(64));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.add_item("u1", &format!("item-{i:02}")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let items = engine.get_inventory("u1").await.unwrap();
    assert_eq!(items.len(), 16);
    assert_eq!(items[0], "item-00");
    assert_eq!(items[15], "item-15");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_removals_empty_the_record() {
    let storage = MemoryStorage::new();
    let engine = InventoryEngine::new(Arc::new(storage.clone()), fast_config(64));
    for item in ["a", "b", "c", "d"] {
        engine.add_item("u1", item).await.unwrap();
    }

    let handles: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|item| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.remove_item("u1", item).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(storage.get("u1").await.unwrap().is_none());
    assert_eq!(storage.inventory_count(), 0);
}

#[tokio::test]
async fn exhausted_attempts_report_contention() {
    let store = Arc::new(AlwaysConflicting {
        puts: AtomicUsize::new(0),
    });
    let engine = InventoryEngine::new(store.clone(), fast_config(3));

    let err = engine.add_item("u1", "milk").await.unwrap_err();
    assert!(matches!(err, InventoryError::Contended { attempts: 3, .. }));
    assert_eq!(store.puts.load(Ordering::SeqCst), 3);
}
