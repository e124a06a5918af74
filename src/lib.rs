//! long-map: hash maps keyed by 64-bit integers, with one table per
//! collision strategy behind a shared `LongMap` interface.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, verifiable `i64 -> V` table where the bucket of a key is
//!   simply `key mod table_len`, with no hashing of generic key types.
//! - Layers:
//!   - `bucket`: Euclidean bucket addressing, fallible bucket allocation,
//!     and the `GrowthPolicy` (load-factor threshold, doubling).
//!   - ChainedLongMap<V>: separate chaining. Entries live in a generational
//!     `SlotMap` arena; buckets hold chain heads and entries hold `next`
//!     links. Exposes stable `Handle`s.
//!   - ProbingLongMap<V>: linear probing over a flat slot array with
//!     backward-shift deletion.
//!   - LongMap<V>: the trait both tables implement.
//!
//! Constraints
//! - Single-threaded: no locks or atomics. Mutation needs `&mut self`;
//!   sharing across threads is the caller's `Mutex`.
//! - At most one entry per key; `len()` always equals the entries reachable
//!   from the buckets.
//! - Growth happens before inserting a new key once
//!   `len >= table_len * load_factor`, and doubles the table.
//! - No shrinking, not even on `clear()`.
//!
//! Resize atomicity
//! - The replacement bucket array is allocated before any entry is touched.
//!   `try_put` reports a failed allocation and leaves the table as it was;
//!   `put` aborts on allocation failure like every std collection.
//! - Chaining rehash only rewires `next` links and chain heads, so entries
//!   never move in the arena and handles stay valid.
//!
//! Absent values
//! - `get` returns `Option<&V>`. A value that itself means "nothing" (say
//!   `V = Option<T>` holding `None`) comes back as `Some(&None)`, and
//!   `contains_key` is true for it.
//!
//! Diagnostics
//! - Debug builds audit the structural invariants after every resize.
//! - The `stats` feature adds `stats()` on both tables: occupancy and
//!   lookup run lengths.

mod bucket;
pub mod chained_map;
pub mod error;
mod long_map;
mod long_map_proptest;
pub mod probing_map;
#[cfg(feature = "stats")]
mod stats;

// Public surface
pub use bucket::{GrowthPolicy, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use chained_map::{ChainedLongMap, Handle};
pub use error::LongMapError;
pub use long_map::LongMap;
pub use probing_map::ProbingLongMap;
#[cfg(feature = "stats")]
pub use stats::TableStats;
