//! Bucket addressing and the growth policy shared by both tables.

use crate::error::LongMapError;

/// Table length used by `new()`.
pub const DEFAULT_CAPACITY: usize = 16;

/// Load factor used by `new()` and `with_capacity()`.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Bucket for `key` in a table of `len` buckets.
///
/// Euclidean remainder, so negative keys (including `i64::MIN`) land in
/// `[0, len)`.
#[inline]
pub(crate) fn bucket_index(key: i64, len: usize) -> usize {
    debug_assert!(len > 0, "bucket array is never empty");
    (key as i128).rem_euclid(len as i128) as usize
}

/// Allocates `len` empty buckets, reporting allocation failure instead of
/// aborting.
pub(crate) fn alloc_buckets<T>(len: usize) -> Result<Vec<Option<T>>, LongMapError> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(len)
        .map_err(|_| LongMapError::AllocFailed { buckets: len })?;
    buckets.resize_with(len, || None);
    Ok(buckets)
}

/// When and how far a table grows.
///
/// A table grows before inserting a new key once
/// `len >= table_len * load_factor`, and each growth doubles the table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GrowthPolicy {
    load_factor: f64,
}

impl GrowthPolicy {
    /// Policy with the given load factor. Must be finite and in `(0.0, 1.0]`.
    pub fn new(load_factor: f64) -> Result<Self, LongMapError> {
        if load_factor.is_finite() && load_factor > 0.0 && load_factor <= 1.0 {
            Ok(Self { load_factor })
        } else {
            Err(LongMapError::InvalidLoadFactor(load_factor))
        }
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// True if inserting one more key into a table holding `len` entries in
    /// `table_len` buckets must grow it first.
    #[inline]
    pub(crate) fn needs_grow(&self, len: usize, table_len: usize) -> bool {
        len as f64 >= table_len as f64 * self.load_factor
    }

    /// Length of the table that replaces one of `table_len` buckets.
    pub(crate) fn grown_len(&self, table_len: usize) -> Result<usize, LongMapError> {
        table_len
            .checked_mul(2)
            .ok_or(LongMapError::CapacityOverflow)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

/// Rejects a zero initial capacity.
pub(crate) fn check_capacity(capacity: usize) -> Result<usize, LongMapError> {
    if capacity == 0 {
        Err(LongMapError::ZeroCapacity)
    } else {
        Ok(capacity)
    }
}
