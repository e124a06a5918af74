//! ProbingLongMap: open addressing with linear probing.
//!
//! Removal uses backward-shift deletion instead of tombstones: after a slot
//! is emptied, later entries of the same probe run are pulled back into the
//! hole so no run ever contains a gap. Lookups can therefore stop at the
//! first empty slot, and the growth trigger only has to count live entries.

use crate::bucket::{alloc_buckets, bucket_index, check_capacity, GrowthPolicy, DEFAULT_CAPACITY};
use crate::error::LongMapError;
use crate::long_map::LongMap;
#[cfg(feature = "stats")]
use crate::stats::TableStats;
use core::fmt;
use core::mem;

#[derive(Debug)]
struct Slot<V> {
    key: i64,
    value: V,
}

/// Outcome of walking a probe run.
enum Probe {
    Found(usize),
    Vacant(usize),
    /// Every slot is taken and none holds the key.
    Exhausted,
}

/// True if `x` lies in the cyclic interval `(lo, hi]`.
#[inline]
fn cyclic_between(lo: usize, x: usize, hi: usize) -> bool {
    if lo <= hi {
        lo < x && x <= hi
    } else {
        lo < x || x <= hi
    }
}

fn empty_slots<V>(len: usize) -> Vec<Option<Slot<V>>> {
    (0..len).map(|_| None).collect()
}

/// Map from `i64` keys using linear probing.
pub struct ProbingLongMap<V> {
    slots: Vec<Option<Slot<V>>>,
    len: usize,
    policy: GrowthPolicy,
}

impl<V> ProbingLongMap<V> {
    /// Empty map with 16 slots and load factor 0.75.
    pub fn new() -> Self {
        Self {
            slots: empty_slots(DEFAULT_CAPACITY),
            len: 0,
            policy: GrowthPolicy::default(),
        }
    }

    /// Empty map with `capacity` slots. Zero is rejected.
    pub fn with_capacity(capacity: usize) -> Result<Self, LongMapError> {
        Self::with_policy(capacity, GrowthPolicy::default())
    }

    pub fn with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f64,
    ) -> Result<Self, LongMapError> {
        Self::with_policy(capacity, GrowthPolicy::new(load_factor)?)
    }

    pub fn with_policy(capacity: usize, policy: GrowthPolicy) -> Result<Self, LongMapError> {
        let len = check_capacity(capacity)?;
        Ok(Self {
            slots: alloc_buckets(len)?,
            len: 0,
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.policy.load_factor()
    }

    /// Walks the probe run for `key`. At most one full lap, so a table
    /// filled to load factor 1.0 still terminates on a miss.
    fn probe(&self, key: i64) -> Probe {
        let n = self.slots.len();
        let mut idx = bucket_index(key, n);
        for _ in 0..n {
            match &self.slots[idx] {
                None => return Probe::Vacant(idx),
                Some(s) if s.key == key => return Probe::Found(idx),
                Some(_) => idx = (idx + 1) % n,
            }
        }
        Probe::Exhausted
    }

    fn position(&self, key: i64) -> Option<usize> {
        match self.probe(key) {
            Probe::Found(i) => Some(i),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: i64) -> Option<&V> {
        let i = self.position(key)?;
        self.slots[i].as_ref().map(|s| &s.value)
    }

    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        let i = self.position(key)?;
        self.slots[i].as_mut().map(|s| &mut s.value)
    }

    fn replace_at(&mut self, i: usize, value: V) -> Option<V> {
        self.slots[i]
            .as_mut()
            .map(|s| mem::replace(&mut s.value, value))
    }

    /// Free slot for a key known to be absent, after growth made room.
    fn vacant_slot(&self, key: i64) -> usize {
        match self.probe(key) {
            Probe::Vacant(i) => i,
            Probe::Found(_) | Probe::Exhausted => {
                unreachable!("grown table must have a free slot for a new key")
            }
        }
    }

    fn occupy(&mut self, idx: usize, key: i64, value: V) {
        debug_assert!(self.slots[idx].is_none());
        self.slots[idx] = Some(Slot { key, value });
        self.len += 1;
    }

    /// Maps `key` to `value`, returning the value it replaced.
    ///
    /// A new key grows the table first when it is at the load-factor
    /// threshold. Growth aborts on allocation failure like `Vec`; use
    /// [`try_put`](Self::try_put) to observe it instead.
    pub fn put(&mut self, key: i64, value: V) -> Option<V> {
        let idx = match self.probe(key) {
            Probe::Found(i) => return self.replace_at(i, value),
            Probe::Vacant(i) if !self.policy.needs_grow(self.len, self.slots.len()) => i,
            Probe::Vacant(_) | Probe::Exhausted => {
                let len = self.slots.len() * 2;
                self.rehash(empty_slots(len));
                self.vacant_slot(key)
            }
        };
        self.occupy(idx, key, value);
        None
    }

    /// Like [`put`](Self::put), but a failed growth is returned as an error
    /// and leaves the map untouched.
    pub fn try_put(&mut self, key: i64, value: V) -> Result<Option<V>, LongMapError> {
        let idx = match self.probe(key) {
            Probe::Found(i) => return Ok(self.replace_at(i, value)),
            Probe::Vacant(i) if !self.policy.needs_grow(self.len, self.slots.len()) => i,
            Probe::Vacant(_) | Probe::Exhausted => {
                let len = self.policy.grown_len(self.slots.len())?;
                self.try_resize(len)?;
                self.vacant_slot(key)
            }
        };
        self.occupy(idx, key, value);
        Ok(None)
    }

    /// Moves every entry into `len` fresh slots. Nothing changes unless the
    /// new slot array was allocated.
    pub(crate) fn try_resize(&mut self, len: usize) -> Result<(), LongMapError> {
        debug_assert!(len > self.len, "resize target must leave a free slot");
        let fresh = alloc_buckets(len)?;
        self.rehash(fresh);
        Ok(())
    }

    fn rehash(&mut self, fresh: Vec<Option<Slot<V>>>) {
        let old = mem::replace(&mut self.slots, fresh);
        let n = self.slots.len();
        for slot in old.into_iter().flatten() {
            let mut idx = bucket_index(slot.key, n);
            while self.slots[idx].is_some() {
                idx = (idx + 1) % n;
            }
            self.slots[idx] = Some(slot);
        }
        #[cfg(debug_assertions)]
        self.assert_invariants();
    }

    /// Removes `key` and closes the gap it leaves in its probe run.
    pub fn remove(&mut self, key: i64) -> Option<V> {
        let mut hole = self.position(key)?;
        let removed = self.slots[hole].take();
        self.len -= 1;

        let n = self.slots.len();
        let mut next = (hole + 1) % n;
        loop {
            let ideal = match &self.slots[next] {
                Some(s) => bucket_index(s.key, n),
                None => break,
            };
            // An entry whose home lies in (hole, next] cannot move back past it.
            if !cyclic_between(hole, ideal, next) {
                self.slots[hole] = self.slots[next].take();
                hole = next;
            }
            next = (next + 1) % n;
        }
        removed.map(|s| s.value)
    }

    pub fn clear(&mut self) {
        self.slots.fill_with(|| None);
        self.len = 0;
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    pub fn keys(&self) -> Vec<i64> {
        self.iter().map(|(k, _)| k).collect()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Entries in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.slots.iter(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            it: self.slots.iter_mut(),
            remaining: self.len,
        }
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> TableStats {
        let n = self.slots.len();
        let mut longest = 0usize;
        let mut visits = 0;
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(s) = slot {
                let run = (i + n - bucket_index(s.key, n)) % n + 1;
                longest = longest.max(run);
                visits += run;
            }
        }
        TableStats::new(self.len, n, self.len, longest, visits)
    }

    /// Panics if any structural invariant is broken: `len` matches the
    /// occupied slots, keys are unique, and no probe run has a gap.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn assert_invariants(&self) {
        let n = self.slots.len();
        let mut seen = std::collections::HashSet::new();
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(s) = slot else { continue };
            assert!(seen.insert(s.key), "key {} stored twice", s.key);
            let mut j = bucket_index(s.key, n);
            while j != i {
                assert!(
                    self.slots[j].is_some(),
                    "gap at slot {} in the probe run of key {}",
                    j,
                    s.key
                );
                j = (j + 1) % n;
            }
        }
        assert_eq!(seen.len(), self.len, "len out of sync with occupied slots");
    }
}

impl<V> Default for ProbingLongMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for ProbingLongMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Extend<(i64, V)> for ProbingLongMap<V> {
    fn extend<I: IntoIterator<Item = (i64, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<V> FromIterator<(i64, V)> for ProbingLongMap<V> {
    fn from_iter<I: IntoIterator<Item = (i64, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<V> LongMap<V> for ProbingLongMap<V> {
    fn put(&mut self, key: i64, value: V) -> Option<V> {
        ProbingLongMap::put(self, key, value)
    }
    fn try_put(&mut self, key: i64, value: V) -> Result<Option<V>, LongMapError> {
        ProbingLongMap::try_put(self, key, value)
    }
    fn get(&self, key: i64) -> Option<&V> {
        ProbingLongMap::get(self, key)
    }
    fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        ProbingLongMap::get_mut(self, key)
    }
    fn remove(&mut self, key: i64) -> Option<V> {
        ProbingLongMap::remove(self, key)
    }
    fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        ProbingLongMap::contains_value(self, value)
    }
    fn keys(&self) -> Vec<i64> {
        ProbingLongMap::keys(self)
    }
    fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        ProbingLongMap::values(self)
    }
    fn len(&self) -> usize {
        self.len
    }
    fn clear(&mut self) {
        ProbingLongMap::clear(self)
    }
    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Iterator over `(key, &value)` in slot order.
pub struct Iter<'a, V> {
    it: core::slice::Iter<'a, Option<Slot<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (i64, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Some(s) = slot {
                self.remaining -= 1;
                return Some((s.key, &s.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// Iterator over `(key, &mut value)` in slot order.
pub struct IterMut<'a, V> {
    it: core::slice::IterMut<'a, Option<Slot<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (i64, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Some(s) = slot {
                self.remaining -= 1;
                return Some((s.key, &mut s.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_at<V>(m: &ProbingLongMap<V>, slot: usize) -> Option<i64> {
        m.slots[slot].as_ref().map(|s| s.key)
    }

    #[test]
    fn cyclic_interval() {
        assert!(cyclic_between(1, 2, 3));
        assert!(cyclic_between(1, 3, 3));
        assert!(!cyclic_between(1, 1, 3));
        assert!(!cyclic_between(1, 4, 3));
        // wrapped: (14, 2] on 16 slots
        assert!(cyclic_between(14, 15, 2));
        assert!(cyclic_between(14, 0, 2));
        assert!(cyclic_between(14, 2, 2));
        assert!(!cyclic_between(14, 14, 2));
        assert!(!cyclic_between(14, 5, 2));
    }

    /// Invariant: a colliding key probes to the next free slot, and removing
    /// the key in front of it pulls it back to its home bucket.
    #[test]
    fn collision_probes_forward_and_shifts_back() {
        let mut m: ProbingLongMap<&str> = ProbingLongMap::new();
        m.put(1, "One");
        m.put(17, "Seventeen");
        assert_eq!(key_at(&m, 1), Some(1));
        assert_eq!(key_at(&m, 2), Some(17));

        assert_eq!(m.remove(1), Some("One"));
        assert_eq!(key_at(&m, 1), Some(17));
        assert_eq!(key_at(&m, 2), None);
        assert_eq!(m.get(17), Some(&"Seventeen"));
        m.assert_invariants();
    }

    /// Invariant: removing from the middle of a run keeps keys that probed past
    /// the removed slot reachable. Emptying the slot alone would hide them.
    #[test]
    fn removal_inside_run_keeps_later_keys_reachable() {
        let mut m: ProbingLongMap<i64> = ProbingLongMap::new();
        for k in [1, 17, 33, 49] {
            m.put(k, k);
        }
        assert_eq!(m.remove(17), Some(17));
        assert_eq!(m.get(33), Some(&33));
        assert_eq!(m.get(49), Some(&49));
        assert_eq!(m.get(1), Some(&1));
        assert_eq!(key_at(&m, 2), Some(33));
        assert_eq!(key_at(&m, 3), Some(49));
        assert_eq!(key_at(&m, 4), None);
        m.assert_invariants();
    }

    /// Invariant: an entry already sitting in its home bucket is never shifted.
    #[test]
    fn entries_at_home_do_not_move() {
        let mut m: ProbingLongMap<i64> = ProbingLongMap::new();
        for k in [1, 17, 3] {
            m.put(k, k);
        }
        assert_eq!(key_at(&m, 3), Some(3));
        m.remove(1);
        assert_eq!(key_at(&m, 1), Some(17));
        assert_eq!(key_at(&m, 2), None);
        assert_eq!(key_at(&m, 3), Some(3));
        m.assert_invariants();
    }

    /// Invariant: backward shift follows a run across the end of the table.
    #[test]
    fn shift_wraps_around_table_end() {
        let mut m: ProbingLongMap<i64> = ProbingLongMap::new();
        for k in [15, 31, 47, 16] {
            m.put(k, k);
        }
        assert_eq!(key_at(&m, 15), Some(15));
        assert_eq!(key_at(&m, 0), Some(31));
        assert_eq!(key_at(&m, 1), Some(47));
        assert_eq!(key_at(&m, 2), Some(16));

        assert_eq!(m.remove(15), Some(15));
        assert_eq!(key_at(&m, 15), Some(31));
        assert_eq!(key_at(&m, 0), Some(47));
        assert_eq!(key_at(&m, 1), Some(16));
        assert_eq!(key_at(&m, 2), None);
        for k in [31, 47, 16] {
            assert_eq!(m.get(k), Some(&k));
        }
        m.assert_invariants();
    }

    /// Invariant: at load factor 1.0 the table may fill completely; misses still
    /// terminate and the next new key grows the table.
    #[test]
    fn full_table_misses_terminate() {
        let mut m: ProbingLongMap<i64> = ProbingLongMap::with_capacity_and_load_factor(4, 1.0).unwrap();
        for k in 0..4 {
            m.put(k * 4, k);
        }
        assert_eq!(m.capacity(), 4);
        assert_eq!(m.len(), 4);
        assert_eq!(m.get(99), None);
        assert!(!m.contains_key(-1));
        assert_eq!(m.remove(99), None);

        m.put(99, 99);
        assert_eq!(m.capacity(), 8);
        for k in 0..4 {
            assert_eq!(m.get(k * 4), Some(&k));
        }
        m.assert_invariants();
    }

    /// Invariant: the table doubles exactly when a new key arrives at
    /// `len == capacity * 0.75`, and overwrites never trigger growth.
    #[test]
    fn growth_threshold() {
        let mut m: ProbingLongMap<u8> = ProbingLongMap::new();
        for k in 0..12 {
            m.put(k, 0);
        }
        assert_eq!(m.capacity(), 16);
        assert_eq!(m.put(5, 1), Some(0));
        assert_eq!(m.capacity(), 16);
        m.put(12, 0);
        assert_eq!(m.capacity(), 32);
        assert_eq!(m.len(), 13);
    }

    /// Invariant: every key stays reachable across resizes, including heavy
    /// same-residue collisions.
    #[test]
    fn resize_preserves_entries() {
        let mut m: ProbingLongMap<i64> = ProbingLongMap::with_capacity(1).unwrap();
        for k in -300..300 {
            m.put(k * 64, k);
        }
        assert_eq!(m.len(), 600);
        for k in -300..300 {
            assert_eq!(m.get(k * 64), Some(&k));
        }
        m.assert_invariants();
    }

    /// Invariant: a failed resize leaves slots and entries untouched.
    #[test]
    fn failed_resize_leaves_map_intact() {
        let mut m: ProbingLongMap<i32> = ProbingLongMap::new();
        for k in 0..10 {
            m.put(k, k as i32);
        }
        let before = m.keys();
        match m.try_resize(usize::MAX / 2) {
            Err(LongMapError::AllocFailed { .. }) => {}
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(m.capacity(), 16);
        assert_eq!(m.keys(), before);
        assert_eq!(m.get(3), Some(&3));
        m.assert_invariants();
    }

    #[test]
    fn try_put_behaves_like_put() {
        let mut m: ProbingLongMap<i32> = ProbingLongMap::new();
        for k in 0..40 {
            assert_eq!(m.try_put(-k, 1), Ok(None));
        }
        assert_eq!(m.try_put(0, 2), Ok(Some(1)));
        assert_eq!(m.len(), 40);
        assert_eq!(m.capacity(), 64);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut m: ProbingLongMap<String> = ProbingLongMap::new();
        for k in 0..20 {
            m.put(k, k.to_string());
        }
        let cap = m.capacity();
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.capacity(), cap);
        assert_eq!(m.iter().count(), 0);
        for k in 0..20 {
            assert_eq!(m.get(k), None);
        }
    }

    #[test]
    fn extreme_keys() {
        let mut m: ProbingLongMap<&str> = ProbingLongMap::new();
        m.put(i64::MIN, "min");
        m.put(0, "zero");
        m.put(i64::MAX, "max");
        assert_eq!(m.get(i64::MIN), Some(&"min"));
        assert_eq!(m.get(0), Some(&"zero"));
        assert_eq!(m.get(i64::MAX), Some(&"max"));
        assert_eq!(m.remove(i64::MIN), Some("min"));
        assert_eq!(m.get(0), Some(&"zero"));
        m.assert_invariants();
    }

    #[test]
    fn iterators_report_exact_len() {
        let mut m: ProbingLongMap<i64> = (0..30).map(|k| (k * 5, k)).collect();
        assert_eq!(m.iter().len(), 30);
        assert_eq!(m.iter_mut().len(), 30);
        for (k, v) in m.iter_mut() {
            *v = k;
        }
        assert!(m.iter().all(|(k, v)| k == *v));
        assert!(m.contains_value(&145));
        assert!(!m.contains_value(&146));
        assert_eq!(m.keys().len(), m.values().len());
    }

    #[test]
    fn constructor_arguments_validated() {
        assert!(matches!(
            ProbingLongMap::<i32>::with_capacity(0),
            Err(LongMapError::ZeroCapacity)
        ));
        assert!(matches!(
            ProbingLongMap::<i32>::with_capacity_and_load_factor(8, f64::NAN),
            Err(LongMapError::InvalidLoadFactor(_))
        ));
    }
}
