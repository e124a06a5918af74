//! Occupancy statistics for both tables (feature `stats`).

/// Snapshot of how full a table is and how long its lookups walk.
///
/// A "run" is the number of chain nodes or probe slots a successful lookup
/// visits before reaching its entry.
#[derive(Clone, Debug, PartialEq)]
pub struct TableStats {
    /// Live entries.
    pub len: usize,
    /// Buckets (chaining) or slots (probing).
    pub buckets: usize,
    /// Buckets holding at least one entry.
    pub occupied_buckets: usize,
    /// Longest run of any stored key.
    pub longest_run: usize,
    /// Mean run over all stored keys; 0.0 when empty.
    pub mean_run: f64,
    /// `len / buckets`.
    pub load: f64,
}

impl TableStats {
    pub(crate) fn new(
        len: usize,
        buckets: usize,
        occupied_buckets: usize,
        longest_run: usize,
        total_run: usize,
    ) -> Self {
        Self {
            len,
            buckets,
            occupied_buckets,
            longest_run,
            mean_run: if len == 0 {
                0.0
            } else {
                total_run as f64 / len as f64
            },
            load: len as f64 / buckets as f64,
        }
    }

    /// Pretty-print the statistics to stdout.
    pub fn print(&self) {
        println!("=== Long Map Statistics ===");
        println!(
            "Population: {} entries in {} buckets ({:.2}% load)",
            self.len,
            self.buckets,
            self.load * 100.0
        );
        println!(
            "Occupied buckets: {} ({:.2}%)",
            self.occupied_buckets,
            self.occupied_buckets as f64 / self.buckets as f64 * 100.0
        );
        println!(
            "Lookup run: mean {:.3}, longest {}",
            self.mean_run, self.longest_run
        );
    }
}
