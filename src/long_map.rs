//! The capability interface shared by both tables.

use crate::error::LongMapError;

/// A map from `i64` keys to values of type `V`.
///
/// Implemented by [`ChainedLongMap`](crate::ChainedLongMap) and
/// [`ProbingLongMap`](crate::ProbingLongMap). Code that only needs map
/// semantics can be written once against this trait.
///
/// `get` returns `Option<&V>`, so a stored value that itself means "absent"
/// (for example `V = Option<T>` holding `None`) comes back as `Some(&None)`
/// and is never confused with a missing key.
pub trait LongMap<V> {
    /// Maps `key` to `value`. Returns the previous value if `key` was present.
    fn put(&mut self, key: i64, value: V) -> Option<V>;

    /// Like [`put`](LongMap::put), but reports a failed growth instead of
    /// aborting. On error the map is unchanged and `value` is dropped.
    fn try_put(&mut self, key: i64, value: V) -> Result<Option<V>, LongMapError>;

    fn get(&self, key: i64) -> Option<&V>;

    fn get_mut(&mut self, key: i64) -> Option<&mut V>;

    /// Removes `key`, returning its value if it was present.
    fn remove(&mut self, key: i64) -> Option<V>;

    fn contains_key(&self, key: i64) -> bool {
        self.get(key).is_some()
    }

    /// Linear scan over every live value.
    fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq;

    /// All keys, in table order. Length equals `len()`.
    fn keys(&self) -> Vec<i64>;

    /// All values, in the same order as [`keys`](LongMap::keys).
    fn values(&self) -> Vec<V>
    where
        V: Clone;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry. The table keeps its current length.
    fn clear(&mut self);

    /// Current number of buckets.
    fn capacity(&self) -> usize;
}
