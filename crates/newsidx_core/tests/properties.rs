//! Property tests shared by every backend.

use newsidx_core::{
    execute, load_index, persist_index, AnyIndex, AvlIndex, BackendKind, BstIndex, HashMapIndex,
    Index, Query,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}").expect("Invalid regex")
}

fn pairs_strategy() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec((key_strategy(), 0u64..50), 0..200)
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    }
}

fn build(kind: BackendKind, pairs: &[(String, u64)]) -> AnyIndex<u64> {
    let mut index = match kind {
        // Small table so growth is exercised.
        BackendKind::Hash => AnyIndex::Hash(HashMapIndex::with_capacity(4)),
        other => AnyIndex::with_kind(other),
    };
    for (key, value) in pairs {
        index.insert(key, *value);
    }
    index
}

/// Expected key -> de-duplicated values in first-insertion order.
fn model(pairs: &[(String, u64)]) -> BTreeMap<&str, Vec<u64>> {
    let mut expected: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for (key, value) in pairs {
        let values = expected.entry(key.as_str()).or_default();
        if !values.contains(value) {
            values.push(*value);
        }
    }
    expected
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn every_backend_sees_the_same_keys(pairs in pairs_strategy()) {
        let expected: Vec<&str> = model(&pairs).keys().copied().collect();
        for kind in BackendKind::ALL {
            let index = build(kind, &pairs);
            prop_assert_eq!(index.keys_in_order(), expected.clone(), "{}", kind);
            prop_assert_eq!(index.len(), expected.len());
        }
    }

    #[test]
    fn inserted_values_are_found(pairs in pairs_strategy()) {
        let expected = model(&pairs);
        for kind in BackendKind::ALL {
            let index = build(kind, &pairs);
            for (key, values) in &expected {
                let found = index.search(key);
                for value in values {
                    prop_assert!(found.contains(value), "{} missing {}:{}", kind, key, value);
                }
                let distinct: BTreeSet<_> = found.iter().collect();
                prop_assert_eq!(distinct.len(), values.len());
            }
        }
    }

    #[test]
    fn dedup_backends_match_model_exactly(pairs in pairs_strategy()) {
        let expected = model(&pairs);
        for kind in [BackendKind::Hash, BackendKind::Array] {
            let index = build(kind, &pairs);
            for (key, values) in &expected {
                prop_assert_eq!(index.search(key), values.as_slice());
            }
        }
    }

    #[test]
    fn avl_stays_balanced(keys in prop::collection::vec(key_strategy(), 0..300)) {
        let mut index = AvlIndex::new();
        for (i, key) in keys.iter().enumerate() {
            index.insert(key, i as u64);
        }
        prop_assert!(index.is_balanced());

        let n = index.count_nodes();
        // Height bound for AVL trees: h < 1.45 * log2(n + 2).
        let bound = 1.45 * ((n + 2) as f64).log2();
        prop_assert!((index.tree_height() as f64) < bound.max(1.0));
    }

    #[test]
    fn sorted_keys_degenerate_bst(n in 1usize..200) {
        let mut index = BstIndex::new();
        for i in 0..n {
            index.insert(&format!("{i:05}"), i as u64);
        }
        prop_assert_eq!(index.tree_height(), n);
        prop_assert_eq!(index.leaf_keys().len(), 1);
    }

    #[test]
    fn hash_survives_growth(keys in prop::collection::btree_set(key_strategy(), 1..300)) {
        let mut index = HashMapIndex::with_capacity(1);
        for key in &keys {
            index.insert(key, 1u64);
        }
        prop_assert_eq!(index.len(), keys.len());
        prop_assert!(index.load_factor() <= index.max_load_factor());
        for key in &keys {
            prop_assert_eq!(index.search(key), &[1]);
        }
    }

    #[test]
    fn persistence_round_trips(pairs in pairs_strategy()) {
        for kind in BackendKind::ALL {
            let index = build(kind, &pairs);
            let bytes = persist_index(&index);
            let restored: AnyIndex<u64> = load_index(&bytes).expect("load");

            prop_assert_eq!(restored.kind(), kind);
            prop_assert_eq!(restored.keys_in_order(), index.keys_in_order());
            for key in index.keys_in_order() {
                prop_assert_eq!(restored.search(key), index.search(key));
            }
            prop_assert_eq!(persist_index(&restored), bytes);
        }
    }

    #[test]
    fn query_results_appear_under_every_term(
        pairs in pairs_strategy(),
        terms in prop::collection::vec(key_strategy(), 1..4),
    ) {
        let query = Query::parse(&terms.join(" "));
        for kind in BackendKind::ALL {
            let index = build(kind, &pairs);
            let outcome = execute(&index, &query);
            prop_assert_eq!(outcome.token_times.len(), terms.len());
            for doc in &outcome.documents {
                for term in query.terms() {
                    prop_assert!(index.search(term).contains(doc));
                }
            }
        }
    }
}
