#![cfg(test)]

// Property tests for both tables kept inside the crate so the structural
// audits (`assert_invariants`) and internal resize hooks stay reachable.

use crate::chained_map::{ChainedLongMap, Handle};
use crate::long_map::LongMap;
use crate::probing_map::ProbingLongMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    TryPut(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(i64),
    ContainsValue(i32),
    Mutate(usize, i32),
    Snapshot,
    Clear,
}

fn arb_ops(pool_len: usize) -> impl Strategy<Value = Vec<OpI>> {
    let idx = 0..pool_len;
    let op = prop_oneof![
        6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
        2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::TryPut(i, v)),
        4 => idx.clone().prop_map(OpI::Remove),
        3 => idx.clone().prop_map(OpI::Get),
        1 => any::<i64>().prop_map(OpI::Contains),
        1 => (-3i32..3).prop_map(OpI::ContainsValue),
        2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
        1 => Just(OpI::Snapshot),
        1 => Just(OpI::Clear),
    ];
    proptest::collection::vec(op, 1..120)
}

// Keys spread over the whole i64 range, edge values included.
fn arb_scenario() -> impl Strategy<Value = (Vec<i64>, Vec<OpI>)> {
    let key = prop_oneof![
        any::<i64>(),
        -40i64..40,
        Just(i64::MIN),
        Just(i64::MAX),
    ];
    proptest::collection::vec(key, 1..=32)
        .prop_flat_map(|pool| (Just(pool.clone()), arb_ops(pool.len())))
}

// Keys from one residue class mod 16, so every key collides in a fresh
// table and most keep colliding after each doubling.
fn arb_colliding_scenario() -> impl Strategy<Value = (Vec<i64>, Vec<OpI>)> {
    proptest::collection::vec(any::<i16>().prop_map(|m| 1 + 16 * i64::from(m)), 1..=40)
        .prop_flat_map(|pool| (Just(pool.clone()), arb_ops(pool.len())))
}

// State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put`/`try_put` return the previous value exactly when the model has one.
// - `get`/`contains_key`/`contains_value` agree with the model.
// - `remove` returns the model's value and a second remove finds nothing.
// - `keys()`/`values()` have length `len()`, correspond pairwise, and the key
//   set equals the model's key set.
// - `len`/`is_empty` parity and a structural audit after each op.
fn run_state_machine<M, F>(
    sut: &mut M,
    pool: &[i64],
    ops: Vec<OpI>,
    audit: F,
) -> Result<(), TestCaseError>
where
    M: LongMap<i32>,
    F: Fn(&M),
{
    let mut model: HashMap<i64, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = pool[i];
                prop_assert_eq!(sut.put(k, v), model.insert(k, v));
            }
            OpI::TryPut(i, v) => {
                let k = pool[i];
                let got = sut.try_put(k, v);
                prop_assert_eq!(got, Ok(model.insert(k, v)));
            }
            OpI::Remove(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(&k));
                prop_assert!(sut.get(k).is_none(), "removed key must be absent");
            }
            OpI::Get(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.get(k), model.get(&k));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
            }
            OpI::Contains(k) => {
                prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
            }
            OpI::ContainsValue(v) => {
                let has_model = model.values().any(|mv| *mv == v);
                prop_assert_eq!(sut.contains_value(&v), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = pool[i];
                match (sut.get_mut(k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "get_mut mismatch: {:?} vs {:?}", s, m),
                }
            }
            OpI::Snapshot => {
                let keys = sut.keys();
                let values = sut.values();
                prop_assert_eq!(keys.len(), sut.len());
                prop_assert_eq!(values.len(), sut.len());
                for (k, v) in keys.iter().zip(&values) {
                    prop_assert_eq!(model.get(k), Some(v));
                }
                let s_keys: BTreeSet<_> = keys.into_iter().collect();
                let m_keys: BTreeSet<_> = model.keys().copied().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap, "clear must not shrink");
            }
        }

        audit(&*sut);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }

    // Every surviving key is still reachable after whatever resizes happened.
    for (k, v) in &model {
        prop_assert_eq!(sut.get(*k), Some(v));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_chained_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainedLongMap<i32> = ChainedLongMap::with_capacity(2).unwrap();
        run_state_machine(&mut sut, &pool, ops, |m| m.assert_invariants())?;
    }

    #[test]
    fn prop_probing_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ProbingLongMap<i32> = ProbingLongMap::with_capacity(2).unwrap();
        run_state_machine(&mut sut, &pool, ops, |m| m.assert_invariants())?;
    }
}

// Same state-machine invariants as above, under worst-case collision
// behavior. This stresses chain unlinking and backward-shift deletion.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_chained_state_machine_with_collisions((pool, ops) in arb_colliding_scenario()) {
        let mut sut: ChainedLongMap<i32> = ChainedLongMap::new();
        run_state_machine(&mut sut, &pool, ops, |m| m.assert_invariants())?;
    }

    #[test]
    fn prop_probing_state_machine_with_collisions((pool, ops) in arb_colliding_scenario()) {
        let mut sut: ProbingLongMap<i32> = ProbingLongMap::new();
        run_state_machine(&mut sut, &pool, ops, |m| m.assert_invariants())?;
    }

    #[test]
    fn prop_probing_full_load_state_machine((pool, ops) in arb_colliding_scenario()) {
        let mut sut: ProbingLongMap<i32> =
            ProbingLongMap::with_capacity_and_load_factor(1, 1.0).unwrap();
        run_state_machine(&mut sut, &pool, ops, |m| m.assert_invariants())?;
    }
}

// Handle tracking for the chained table:
// - a handle found for a live key resolves to that key until it is removed;
// - stale handles never resolve again, across reinserts and resizes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_chained_handles((pool, ops) in arb_colliding_scenario()) {
        let mut sut: ChainedLongMap<i32> = ChainedLongMap::with_capacity(1).unwrap();
        let mut live: HashMap<i64, Handle> = HashMap::new();
        let mut stale: Vec<Handle> = Vec::new();

        for op in ops {
            match op {
                OpI::Put(i, v) | OpI::TryPut(i, v) => {
                    let k = pool[i];
                    sut.put(k, v);
                    let h = sut.find(k).expect("key present after put");
                    if let Some(prev) = live.insert(k, h) {
                        prop_assert_eq!(prev, h, "overwrite keeps the entry");
                    }
                }
                OpI::Remove(i) => {
                    let k = pool[i];
                    if let Some(h) = live.remove(&k) {
                        let (kk, _) = sut.take(h).expect("live handle removable");
                        prop_assert_eq!(kk, k);
                        stale.push(h);
                    } else {
                        prop_assert!(sut.remove(k).is_none());
                    }
                }
                OpI::Clear => {
                    sut.clear();
                    stale.extend(live.drain().map(|(_, h)| h));
                }
                _ => {}
            }

            for (&k, &h) in &live {
                prop_assert_eq!(h.key(&sut), Some(k));
            }
            for &h in &stale {
                prop_assert!(h.value(&sut).is_none());
            }
            prop_assert_eq!(sut.len(), live.len());
        }
    }
}
