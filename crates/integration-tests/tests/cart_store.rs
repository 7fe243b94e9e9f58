//! Integration tests for the cart mutation protocol.
//!
//! These tests drive a `CartStore` over a recording storage backend and
//! check both the in-memory cart and every snapshot written.

use std::sync::Arc;

use go_marketplace_cart::{CartError, CartStore, DEFAULT_CART_KEY, LoadState, snapshot};
use go_marketplace_integration_tests::{RecordingStorage, pid, product, recording_store};

// =============================================================================
// Mutation Protocol
// =============================================================================

#[tokio::test]
async fn test_add_new_item_creates_single_line() {
    let (store, _) = recording_store().await;

    store.add_to_cart(product("a", "10")).await.unwrap();

    let items = store.items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, pid("a"));
    assert_eq!(items[0].quantity, 1);
}

#[tokio::test]
async fn test_add_existing_equals_increment() {
    let (via_add, _) = recording_store().await;
    let (via_increment, _) = recording_store().await;

    via_add.add_to_cart(product("a", "10")).await.unwrap();
    via_add.add_to_cart(product("a", "10")).await.unwrap();

    via_increment.add_to_cart(product("a", "10")).await.unwrap();
    via_increment.increment(&pid("a")).await.unwrap();

    assert_eq!(
        via_add.items().await.unwrap(),
        via_increment.items().await.unwrap()
    );
    assert_eq!(via_add.items().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_increment_decrement_symmetry() {
    let (store, _) = recording_store().await;
    store.add_to_cart(product("a", "10")).await.unwrap();
    store.increment(&pid("a")).await.unwrap();

    for _ in 0..5 {
        store.increment(&pid("a")).await.unwrap();
    }
    for _ in 0..5 {
        store.decrement(&pid("a")).await.unwrap();
    }

    assert_eq!(store.get(&pid("a")).await.unwrap().unwrap().quantity, 2);
}

#[tokio::test]
async fn test_decrement_at_one_removes_line() {
    let (store, _) = recording_store().await;
    store.add_to_cart(product("a", "10")).await.unwrap();
    store.add_to_cart(product("b", "5")).await.unwrap();

    assert_eq!(store.decrement(&pid("a")).await.unwrap(), None);

    let items = store.items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, pid("b"));
    assert!(store.get(&pid("a")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_example_walkthrough() {
    let (store, storage) = recording_store().await;

    store.add_to_cart(product("a", "10")).await.unwrap();
    store.increment(&pid("a")).await.unwrap();
    store.decrement(&pid("a")).await.unwrap();
    store.decrement(&pid("a")).await.unwrap();

    assert!(store.items().await.unwrap().is_empty());

    let quantities: Vec<Vec<u32>> = storage
        .writes()
        .iter()
        .map(|raw| {
            snapshot::decode(raw)
                .unwrap()
                .iter()
                .map(|item| item.quantity)
                .collect()
        })
        .collect();
    assert_eq!(quantities, vec![vec![1], vec![2], vec![1], vec![]]);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_every_mutation_writes_whole_snapshot() {
    let (store, storage) = recording_store().await;

    store.add_to_cart(product("a", "10")).await.unwrap();
    store.add_to_cart(product("b", "2.5")).await.unwrap();
    store.increment(&pid("a")).await.unwrap();

    let writes = storage.writes();
    assert_eq!(writes.len(), 3);
    let last = snapshot::decode(writes.last().unwrap()).unwrap();
    assert_eq!(last, store.items().await.unwrap());
}

#[tokio::test]
async fn test_snapshot_reloads_into_identical_cart() {
    let (store, storage) = recording_store().await;
    store.add_to_cart(product("x", "19.99")).await.unwrap();
    store.add_to_cart(product("y", "0.5")).await.unwrap();
    store.add_to_cart(product("x", "19.99")).await.unwrap();

    let raw = storage.writes().pop().unwrap();
    let reloaded = CartStore::new(Arc::new(RecordingStorage::with_snapshot(&raw)), DEFAULT_CART_KEY);
    reloaded.initialize().await;

    assert_eq!(reloaded.items().await.unwrap(), store.items().await.unwrap());
}

#[tokio::test]
async fn test_reload_keeps_exact_prices() {
    for price in ["0.1234567890123456789", "79228162514264337593543950335"] {
        let (store, storage) = recording_store().await;
        store.add_to_cart(product("a", price)).await.unwrap();
        store.add_to_cart(product("b", "1")).await.unwrap();

        let raw = storage.writes().pop().unwrap();
        let reloaded = CartStore::new(Arc::new(RecordingStorage::with_snapshot(&raw)), DEFAULT_CART_KEY);
        reloaded.initialize().await;

        let items = reloaded.items().await.unwrap();
        assert_eq!(items, store.items().await.unwrap());
        assert_eq!(items[0].price.amount().to_string(), price);
    }
}

#[tokio::test]
async fn test_snapshot_is_plain_json_array() {
    let (store, storage) = recording_store().await;
    store.add_to_cart(product("a", "10")).await.unwrap();

    let value: serde_json::Value = serde_json::from_str(&storage.writes()[0]).unwrap();
    let lines = value.as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["id"], "a");
    assert_eq!(lines[0]["quantity"], 1);
    assert!(lines[0]["price"].is_number());
    assert_eq!(lines[0]["image_url"], "https://cdn.example/a.png");
}

#[tokio::test]
async fn test_unknown_id_writes_nothing() {
    let (store, storage) = recording_store().await;

    assert!(matches!(
        store.increment(&pid("nope")).await,
        Err(CartError::ItemNotFound(id)) if id == pid("nope")
    ));
    assert!(matches!(
        store.decrement(&pid("nope")).await,
        Err(CartError::ItemNotFound(_))
    ));
    assert!(storage.writes().is_empty());
}

#[tokio::test]
async fn test_failed_write_is_caught_up_by_next_write() {
    let (store, storage) = recording_store().await;
    store.add_to_cart(product("a", "10")).await.unwrap();

    storage.set_fail_writes(true);
    assert!(matches!(
        store.increment(&pid("a")).await,
        Err(CartError::Storage(_))
    ));
    assert_eq!(store.get(&pid("a")).await.unwrap().unwrap().quantity, 2);
    assert_eq!(storage.writes().len(), 1);

    storage.set_fail_writes(false);
    store.increment(&pid("a")).await.unwrap();
    let last = snapshot::decode(storage.writes().last().unwrap()).unwrap();
    assert_eq!(last[0].quantity, 3);
}

// =============================================================================
// Hydration
// =============================================================================

#[tokio::test]
async fn test_loading_until_initialized() {
    let store = CartStore::new(Arc::new(RecordingStorage::new()), DEFAULT_CART_KEY);
    assert_eq!(store.load_state(), LoadState::Loading);
    assert!(store.view().await.loading);
    assert!(matches!(
        store.increment(&pid("a")).await,
        Err(CartError::StoreNotInitialized)
    ));

    store.initialize().await;

    assert_eq!(store.load_state(), LoadState::Ready);
    assert!(!store.view().await.loading);
}

#[tokio::test]
async fn test_undecodable_snapshot_starts_empty() {
    for raw in ["", "null", "{}", "[{\"id\":\"a\"}]", "[1,2,3]"] {
        let store = CartStore::new(
            Arc::new(RecordingStorage::with_snapshot(raw)),
            DEFAULT_CART_KEY,
        );
        store.initialize().await;
        assert!(!store.is_loading(), "still loading for {raw:?}");
        assert!(store.items().await.unwrap().is_empty(), "not empty for {raw:?}");
    }
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mutations_keep_storage_in_step() {
    let (store, storage) = recording_store().await;
    storage.set_yield_on_write(true);
    store.add_to_cart(product("a", "1")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                store.increment(&pid("a")).await.map(drop)
            } else {
                store.add_to_cart(product(&format!("p{i}"), "2")).await.map(drop)
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let items = store.items().await.unwrap();
    assert_eq!(items.len(), 11);
    assert_eq!(items[0].quantity, 11);

    let writes = storage.writes();
    assert_eq!(writes.len(), 21);
    assert_eq!(snapshot::decode(writes.last().unwrap()).unwrap(), items);

    let counts: Vec<u64> = writes
        .iter()
        .map(|raw| {
            snapshot::decode(raw)
                .unwrap()
                .iter()
                .map(|item| u64::from(item.quantity))
                .sum()
        })
        .collect();
    assert!(counts.windows(2).all(|pair| pair[1] == pair[0] + 1));
}
