#![cfg(test)]

// Property tests for OpenAddressingMap kept inside the crate so they can
// inspect the raw slot array.

use crate::map::OpenAddressingMap;
use crate::slot::Slot;
use crate::table::home_index;
use crate::MAX_LOAD_FACTOR;
use core::hash::{BuildHasher, Hash, Hasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;

// Folds every key into a handful of hashes, some negative, so chains are
// long and wrap around the table end.
#[derive(Clone, Default)]
struct CollidingBuildHasher;
#[derive(Default)]
struct CollidingHasher(u64);

impl BuildHasher for CollidingBuildHasher {
    type Hasher = CollidingHasher;
    fn build_hasher(&self) -> Self::Hasher {
        CollidingHasher(0)
    }
}

impl Hasher for CollidingHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(u64::from(b));
        }
    }
    fn finish(&self) -> u64 {
        ((self.0 % 7) as i64 - 3) as u64
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, i32),
    Remove(u8),
    Get(u8),
    ContainsValue(i32),
    Clear,
    Snapshot,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let key = 0u8..40;
    let value = -4i32..4;
    let op = prop_oneof![
        6 => (key.clone(), value.clone()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.prop_map(Op::Get),
        1 => value.prop_map(Op::ContainsValue),
        1 => Just(Op::Clear),
        1 => Just(Op::Snapshot),
    ];
    proptest::collection::vec(op, 1..200)
}

/// Smallest table on the `11, 23, 47, ...` ladder that holds `live` entries
/// under the load bound.
fn capacity_for(live: usize) -> usize {
    let mut cap = crate::INITIAL_CAPACITY;
    while live as f64 / cap as f64 > MAX_LOAD_FACTOR {
        cap = 2 * cap + 1;
    }
    cap
}

/// Checks the slot array against the counters and the probe-chain rule:
/// every live entry is reachable from its home index without crossing an
/// empty slot.
fn check_structure<K, V, S>(m: &OpenAddressingMap<K, V, S>) -> Result<(), TestCaseError>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    let slots = m.raw().slots();
    let cap = slots.len();
    prop_assert_eq!(cap, m.capacity());

    let occupied = slots.iter().filter(|s| s.entry().is_some()).count();
    prop_assert_eq!(occupied, m.len());
    prop_assert_eq!(m.locations_used(), m.len());
    prop_assert!(m.load_factor() <= MAX_LOAD_FACTOR);

    for (i, slot) in slots.iter().enumerate() {
        if let Slot::Occupied { hash, .. } = slot {
            let mut j = home_index(*hash, cap);
            while j != i {
                prop_assert!(!slots[j].is_empty(), "empty slot {} breaks chain to {}", j, i);
                j = (j + 1) % cap;
            }
        }
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `insert` returns the previous value exactly when the model had one.
// - `remove` returns the model's value and leaves the key absent.
// - `get`/`contains_key` parity with the model, including after tombstoning.
// - `contains_value` matches a scan of the model.
// - Snapshots (`key_set`, `values`, `entry_set`) equal the model's contents.
// - Counters and probe chains stay consistent after every step.
// - Capacity is exactly the ladder step for the peak live count.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops()) {
        let mut sut: OpenAddressingMap<u8, i32, CollidingBuildHasher> =
            OpenAddressingMap::with_hasher(CollidingBuildHasher);
        let mut model: HashMap<u8, i32> = HashMap::new();
        // Largest live count since construction or the last clear.
        let mut peak = 0usize;

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let cap_before = sut.capacity();
                    let was_present = model.contains_key(&k);
                    prop_assert_eq!(sut.insert(k, v), model.insert(k, v));
                    if was_present {
                        prop_assert_eq!(sut.capacity(), cap_before, "updates never grow");
                    } else {
                        let grown = sut.capacity() == 2 * cap_before + 1;
                        prop_assert!(sut.capacity() == cap_before || grown);
                    }
                }
                Op::Remove(k) => {
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                    prop_assert!(!sut.contains_key(&k));
                }
                Op::Get(k) => {
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                    prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
                }
                Op::ContainsValue(v) => {
                    prop_assert_eq!(sut.contains_value(&v), model.values().any(|x| *x == v));
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    peak = 0;
                    prop_assert_eq!(sut.capacity(), crate::INITIAL_CAPACITY);
                }
                Op::Snapshot => {
                    let keys: std::collections::BTreeSet<u8> = sut.key_set().into_iter().collect();
                    let expected: std::collections::BTreeSet<u8> = model.keys().copied().collect();
                    prop_assert_eq!(keys, expected);

                    let mut values = sut.values();
                    let mut expected_values: Vec<i32> = model.values().copied().collect();
                    values.sort_unstable();
                    expected_values.sort_unstable();
                    prop_assert_eq!(values, expected_values);

                    let mut entries = sut.entry_set();
                    let mut expected_entries: Vec<(u8, i32)> =
                        model.iter().map(|(k, v)| (*k, *v)).collect();
                    entries.sort_unstable();
                    expected_entries.sort_unstable();
                    prop_assert_eq!(entries, expected_entries);
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            peak = peak.max(model.len());
            // Churn never grows the table: capacity depends on the peak only.
            prop_assert_eq!(sut.capacity(), capacity_for(peak));
            check_structure(&sut)?;
        }

        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
}

// Property: round trip holds for arbitrary string keys under the default
// hasher, across however many rehashes the batch triggers.
proptest! {
    #[test]
    fn prop_round_trip_strings(pairs in proptest::collection::vec(("[a-z]{0,6}", any::<i64>()), 1..120)) {
        let mut m: OpenAddressingMap<String, i64> = OpenAddressingMap::new();
        let mut model: HashMap<String, i64> = HashMap::new();
        for (k, v) in pairs {
            m.insert(k.clone(), v);
            model.insert(k, v);
        }
        prop_assert_eq!(m.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(m.get(k.as_str()), Some(v));
        }
        check_structure(&m)?;
    }
}
