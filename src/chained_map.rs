//! ChainedLongMap: separate chaining over a handle-addressed entry arena.

use crate::bucket::{alloc_buckets, bucket_index, check_capacity, GrowthPolicy, DEFAULT_CAPACITY};
use crate::error::LongMapError;
use crate::long_map::LongMap;
#[cfg(feature = "stats")]
use crate::stats::TableStats;
use core::fmt;
use core::mem;
use slotmap::{DefaultKey, SlotMap};

/// Stable name for one entry of a [`ChainedLongMap`].
///
/// Handles survive resizes. Once the entry is removed the handle never
/// resolves again, even if its arena slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    pub fn key<V>(&self, map: &ChainedLongMap<V>) -> Option<i64> {
        map.handle_key(*self)
    }

    pub fn value<'a, V>(&self, map: &'a ChainedLongMap<V>) -> Option<&'a V> {
        map.handle_value(*self)
    }

    pub fn value_mut<'a, V>(&self, map: &'a mut ChainedLongMap<V>) -> Option<&'a mut V> {
        map.handle_value_mut(*self)
    }
}

#[derive(Debug)]
struct Entry<V> {
    key: i64,
    value: V,
    next: Option<DefaultKey>,
}

/// Map from `i64` keys using separate chaining.
///
/// Each bucket holds the head handle of a singly linked chain; the entries
/// themselves live in a generational arena owned by the map. New keys are
/// prepended to their bucket's chain.
pub struct ChainedLongMap<V> {
    heads: Vec<Option<DefaultKey>>,
    slots: SlotMap<DefaultKey, Entry<V>>, // storage using generational keys
    policy: GrowthPolicy,
}

impl<V> ChainedLongMap<V> {
    /// Empty map with 16 buckets and load factor 0.75.
    pub fn new() -> Self {
        Self {
            heads: vec![None; DEFAULT_CAPACITY],
            slots: SlotMap::with_key(),
            policy: GrowthPolicy::default(),
        }
    }

    /// Empty map with `capacity` buckets. Zero is rejected.
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
            heads: alloc_buckets(len)?,
            slots: SlotMap::with_key(),
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.heads.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.policy.load_factor()
    }

    /// Walks the chain for `key`, returning its predecessor (if any) and
    /// its own arena key.
    fn locate(&self, idx: usize, key: i64) -> Option<(Option<DefaultKey>, DefaultKey)> {
        let mut prev = None;
        let mut cursor = self.heads[idx];
        while let Some(k) = cursor {
            let e = self.slots.get(k)?;
            if e.key == key {
                return Some((prev, k));
            }
            prev = Some(k);
            cursor = e.next;
        }
        None
    }

    /// Unlinks `target` from bucket `idx` and frees its arena slot.
    fn detach(
        &mut self,
        idx: usize,
        prev: Option<DefaultKey>,
        target: DefaultKey,
    ) -> Option<Entry<V>> {
        let entry = self.slots.remove(target)?;
        match prev {
            Some(p) => {
                if let Some(pe) = self.slots.get_mut(p) {
                    pe.next = entry.next;
                }
            }
            None => self.heads[idx] = entry.next,
        }
        Some(entry)
    }

    pub fn find(&self, key: i64) -> Option<Handle> {
        let idx = bucket_index(key, self.heads.len());
        self.locate(idx, key).map(|(_, k)| Handle::new(k))
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: i64) -> Option<&V> {
        let h = self.find(key)?;
        self.slots.get(h.raw_handle()).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        let h = self.find(key)?;
        self.slots.get_mut(h.raw_handle()).map(|e| &mut e.value)
    }

    /// Maps `key` to `value`, returning the value it replaced.
    ///
    /// A new key grows the table first when it is at the load-factor
    /// threshold. Growth aborts on allocation failure like `Vec`; use
    /// [`try_put`](Self::try_put) to observe it instead.
    pub fn put(&mut self, key: i64, value: V) -> Option<V> {
        if let Some(slot) = self.get_mut(key) {
            return Some(mem::replace(slot, value));
        }
        if self.policy.needs_grow(self.len(), self.heads.len()) {
            let len = self.heads.len() * 2;
            self.rehash(vec![None; len]);
        }
        self.link_new(key, value);
        None
    }

    /// Like [`put`](Self::put), but a failed growth is returned as an error
    /// and leaves the map untouched.
    pub fn try_put(&mut self, key: i64, value: V) -> Result<Option<V>, LongMapError> {
        if let Some(slot) = self.get_mut(key) {
            return Ok(Some(mem::replace(slot, value)));
        }
        if self.policy.needs_grow(self.len(), self.heads.len()) {
            let len = self.policy.grown_len(self.heads.len())?;
            self.try_resize(len)?;
        }
        self.link_new(key, value);
        Ok(None)
    }

    fn link_new(&mut self, key: i64, value: V) {
        let idx = bucket_index(key, self.heads.len());
        let next = self.heads[idx];
        let k = self.slots.insert(Entry { key, value, next });
        self.heads[idx] = Some(k);
    }

    /// Rebuilds the chains over `len` buckets. Nothing changes unless the
    /// new bucket array was allocated.
    pub(crate) fn try_resize(&mut self, len: usize) -> Result<(), LongMapError> {
        let heads = alloc_buckets(len)?;
        self.rehash(heads);
        Ok(())
    }

    fn rehash(&mut self, mut heads: Vec<Option<DefaultKey>>) {
        let len = heads.len();
        for (k, entry) in self.slots.iter_mut() {
            let idx = bucket_index(entry.key, len);
            entry.next = heads[idx];
            heads[idx] = Some(k);
        }
        self.heads = heads;
        #[cfg(debug_assertions)]
        self.assert_invariants();
    }

    pub fn remove(&mut self, key: i64) -> Option<V> {
        let idx = bucket_index(key, self.heads.len());
        let (prev, target) = self.locate(idx, key)?;
        self.detach(idx, prev, target).map(|e| e.value)
    }

    /// Removes the entry named by `handle`. Stale handles return `None`.
    pub fn take(&mut self, handle: Handle) -> Option<(i64, V)> {
        let key = self.slots.get(handle.raw_handle())?.key;
        let idx = bucket_index(key, self.heads.len());
        let (prev, target) = self
            .locate(idx, key)
            .expect("live entry must be reachable from its bucket");
        debug_assert_eq!(target, handle.raw_handle());
        self.detach(idx, prev, target).map(|e| (e.key, e.value))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.heads.fill(None);
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.slots.values().any(|e| e.value == *value)
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

    pub(crate) fn handle_key(&self, h: Handle) -> Option<i64> {
        self.slots.get(h.raw_handle()).map(|e| e.key)
    }

    pub(crate) fn handle_value(&self, h: Handle) -> Option<&V> {
        self.slots.get(h.raw_handle()).map(|e| &e.value)
    }

    pub(crate) fn handle_value_mut(&mut self, h: Handle) -> Option<&mut V> {
        self.slots.get_mut(h.raw_handle()).map(|e| &mut e.value)
    }

    /// Entries bucket by bucket, each chain from head to tail.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            heads: self.heads.iter(),
            slots: &self.slots,
            cursor: None,
            remaining: self.slots.len(),
        }
    }

    /// Mutable access to every value, in arena order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> TableStats {
        let mut occupied = 0;
        let mut longest = 0usize;
        let mut visits = 0;
        for &head in &self.heads {
            let mut run = 0;
            let mut cursor = head;
            while let Some(k) = cursor {
                run += 1;
                cursor = self.slots.get(k).and_then(|e| e.next);
            }
            if run > 0 {
                occupied += 1;
            }
            longest = longest.max(run);
            // A hit at chain position p walks p + 1 nodes.
            visits += run * (run + 1) / 2;
        }
        TableStats::new(self.len(), self.heads.len(), occupied, longest, visits)
    }

    /// Panics if any structural invariant is broken: every entry reachable
    /// exactly once from the bucket its key maps to.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn assert_invariants(&self) {
        let mut seen = std::collections::HashSet::new();
        for (idx, &head) in self.heads.iter().enumerate() {
            let mut cursor = head;
            while let Some(k) = cursor {
                let e = self
                    .slots
                    .get(k)
                    .unwrap_or_else(|| panic!("bucket {} links a freed entry", idx));
                assert_eq!(
                    bucket_index(e.key, self.heads.len()),
                    idx,
                    "key {} chained in the wrong bucket",
                    e.key
                );
                assert!(seen.insert(e.key), "key {} reachable twice", e.key);
                assert!(seen.len() <= self.slots.len(), "cycle in bucket {}", idx);
                cursor = e.next;
            }
        }
        assert_eq!(seen.len(), self.slots.len(), "unreachable entries in arena");
    }
}

impl<V> Default for ChainedLongMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for ChainedLongMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Extend<(i64, V)> for ChainedLongMap<V> {
    fn extend<I: IntoIterator<Item = (i64, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<V> FromIterator<(i64, V)> for ChainedLongMap<V> {
    fn from_iter<I: IntoIterator<Item = (i64, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<V> LongMap<V> for ChainedLongMap<V> {
    fn put(&mut self, key: i64, value: V) -> Option<V> {
        ChainedLongMap::put(self, key, value)
    }
    fn try_put(&mut self, key: i64, value: V) -> Result<Option<V>, LongMapError> {
        ChainedLongMap::try_put(self, key, value)
    }
    fn get(&self, key: i64) -> Option<&V> {
        ChainedLongMap::get(self, key)
    }
    fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        ChainedLongMap::get_mut(self, key)
    }
    fn remove(&mut self, key: i64) -> Option<V> {
        ChainedLongMap::remove(self, key)
    }
    fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        ChainedLongMap::contains_value(self, value)
    }
    fn keys(&self) -> Vec<i64> {
        ChainedLongMap::keys(self)
    }
    fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        ChainedLongMap::values(self)
    }
    fn len(&self) -> usize {
        ChainedLongMap::len(self)
    }
    fn clear(&mut self) {
        ChainedLongMap::clear(self)
    }
    fn capacity(&self) -> usize {
        ChainedLongMap::capacity(self)
    }
}

/// Iterator over `(key, &value)` in bucket order.
pub struct Iter<'a, V> {
    heads: core::slice::Iter<'a, Option<DefaultKey>>,
    slots: &'a SlotMap<DefaultKey, Entry<V>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (i64, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cursor {
                let slots: &'a SlotMap<DefaultKey, Entry<V>> = self.slots;
                let e = slots.get(k)?;
                self.cursor = e.next;
                self.remaining -= 1;
                return Some((e.key, &e.value));
            }
            self.cursor = *self.heads.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// Iterator over `(key, &mut value)` in arena order.
pub struct IterMut<'a, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<V>>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (i64, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}
