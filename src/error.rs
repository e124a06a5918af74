//! Error type shared by both tables.

use core::fmt;

/// Failure to build or grow a table.
///
/// Lookups and removals never fail; a missing key is `None`. Only
/// construction and growth report errors.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum LongMapError {
    /// Initial capacity was zero.
    ZeroCapacity,
    /// Load factor not finite or outside `(0.0, 1.0]`.
    InvalidLoadFactor(f64),
    /// Doubling the table length would overflow `usize`.
    CapacityOverflow,
    /// The allocator refused a bucket array of this length.
    AllocFailed { buckets: usize },
}

impl LongMapError {
    /// True for errors caused by a bad constructor argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::ZeroCapacity | Self::InvalidLoadFactor(_))
    }
}

impl fmt::Display for LongMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => f.write_str("capacity must be positive"),
            Self::InvalidLoadFactor(lf) => {
                write!(f, "load factor must be in (0.0, 1.0], got {}", lf)
            }
            Self::CapacityOverflow => f.write_str("table length overflows usize"),
            Self::AllocFailed { buckets } => {
                write!(f, "failed to allocate a table of {} buckets", buckets)
            }
        }
    }
}

impl std::error::Error for LongMapError {}

#[cfg(test)]
mod tests {
    use super::LongMapError;

    #[test]
    fn argument_errors_are_classified() {
        assert!(LongMapError::ZeroCapacity.is_invalid_argument());
        assert!(LongMapError::InvalidLoadFactor(1.5).is_invalid_argument());
        assert!(!LongMapError::CapacityOverflow.is_invalid_argument());
        assert!(!LongMapError::AllocFailed { buckets: 8 }.is_invalid_argument());
    }

    #[test]
    fn display_names_the_offending_value() {
        assert_eq!(
            LongMapError::InvalidLoadFactor(2.0).to_string(),
            "load factor must be in (0.0, 1.0], got 2"
        );
        assert_eq!(
            LongMapError::AllocFailed { buckets: 64 }.to_string(),
            "failed to allocate a table of 64 buckets"
        );
    }
}
