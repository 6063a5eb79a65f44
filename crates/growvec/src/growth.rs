//! Capacity growth policies.
//!
//! Growth is geometric so that a run of `N` appends performs `O(log N)`
//! reallocations and moves `O(N)` elements in total, giving amortized
//! constant-time append. The factor is fixed per buffer at construction.

use std::fmt;

/// Geometric capacity growth rule applied when an append finds the
/// storage block full.
///
/// Both policies start an empty buffer at capacity 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GrowthPolicy {
    /// `capacity * 2`. The default.
    #[default]
    Doubling,
    /// `capacity + ceil(capacity / 2)`, i.e. a factor of 1.5 rounded up,
    /// so no step falls below 1.5x.
    ThreeHalves,
}

impl GrowthPolicy {
    /// The nominal growth factor.
    pub fn factor(self) -> f64 {
        match self {
            Self::Doubling => 2.0,
            Self::ThreeHalves => 1.5,
        }
    }

    /// Capacity of the block that replaces a full block of `capacity`
    /// elements.
    ///
    /// Returns `None` if the result does not fit in `usize`.
    pub fn next_capacity(self, capacity: usize) -> Option<usize> {
        if capacity == 0 {
            return Some(1);
        }
        match self {
            Self::Doubling => capacity.checked_mul(2),
            Self::ThreeHalves => capacity.checked_add(capacity.div_ceil(2)),
        }
    }
}

impl fmt::Display for GrowthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doubling => write!(f, "doubling"),
            Self::ThreeHalves => write!(f, "three-halves"),
        }
    }
}
