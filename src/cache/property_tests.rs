//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store-level correctness properties across both
//! eviction strategies, including internal-structure consistency under
//! random operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::store::Store;
use crate::cache::{LfuStore, LruStore};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL: Duration = Duration::from_secs(300);

/// Capacity small enough that random op sequences actually evict.
const SMALL_CAPACITY: usize = 8;

// == Strategies ==
/// Generates cache keys from a small alphabet so ops collide often.
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-d][0-9]{0,2}".prop_map(|s| s)
}

/// Generates cache values.
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}".prop_map(|s| s)
}

/// A single cache operation for sequence testing.
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// Both strategies behind the uniform contract.
fn stores() -> Vec<Box<dyn Store<String, String>>> {
    vec![
        Box::new(LruStore::new(TEST_MAX_ENTRIES, TEST_TTL)),
        Box::new(LfuStore::new(TEST_MAX_ENTRIES, TEST_TTL)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // *For any* key-value pair, a set followed by a get within the TTL
    // window returns the stored value, under either strategy.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        for store in &mut stores() {
            store.set(key.clone(), value.clone(), None);
            prop_assert_eq!(store.get(&key), Some(value.clone()));
        }
    }

    // *For any* key, storing V1 and then V2 leaves exactly one entry,
    // holding V2.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        for store in &mut stores() {
            store.set(key.clone(), value1.clone(), None);
            store.set(key.clone(), value2.clone(), None);

            prop_assert_eq!(store.get(&key), Some(value2.clone()));
            prop_assert_eq!(store.len(), 1);
        }
    }

    // *For any* stored key, a delete makes the next get a miss.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        for store in &mut stores() {
            store.set(key.clone(), value.clone(), None);
            prop_assert!(store.get(&key).is_some());

            prop_assert!(store.delete(&key));
            prop_assert_eq!(store.get(&key), None);
        }
    }

    // *For any* op sequence short enough that no eviction can occur, both
    // strategies agree exactly with a plain map model.
    #[test]
    fn prop_model_agreement(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        for store in &mut stores() {
            let mut model: HashMap<String, String> = HashMap::new();

            for op in &ops {
                match op {
                    CacheOp::Set { key, value } => {
                        store.set(key.clone(), value.clone(), None);
                        model.insert(key.clone(), value.clone());
                    }
                    CacheOp::Get { key } => {
                        prop_assert_eq!(store.get(key), model.get(key).cloned());
                    }
                    CacheOp::Delete { key } => {
                        prop_assert_eq!(store.delete(key), model.remove(key).is_some());
                    }
                }
            }

            prop_assert_eq!(store.len(), model.len());
        }
    }

    // *For any* op sequence against a small LRU store, the size never
    // exceeds capacity and index/list stay mutually consistent.
    #[test]
    fn prop_lru_consistency(ops in prop::collection::vec(cache_op_strategy(), 1..150)) {
        let mut store: LruStore<String, String> = LruStore::new(SMALL_CAPACITY, TEST_TTL);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => {
                    let _ = store.get(&key);
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
            store.assert_consistent();
            prop_assert!(store.len() <= SMALL_CAPACITY);
        }
    }

    // *For any* op sequence against a small LFU store, the size never
    // exceeds capacity and index/arena/heap (slots included) stay mutually
    // consistent.
    #[test]
    fn prop_lfu_consistency(ops in prop::collection::vec(cache_op_strategy(), 1..150)) {
        let mut store: LfuStore<String, String> = LfuStore::new(SMALL_CAPACITY, TEST_TTL);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => {
                    let _ = store.get(&key);
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
            store.assert_consistent();
            prop_assert!(store.len() <= SMALL_CAPACITY);
        }
    }
}
