//! Strongly-typed identifiers for buffers and their storage generations.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`BufferId`] allocation.
static BUFFER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a buffer.
///
/// Allocated from a monotonic atomic counter via [`BufferId::next`].
/// Two distinct buffers always have different IDs, even if one was
/// dropped and the other was allocated at the same address. Checked
/// element references carry the ID of the buffer they were taken from
/// so they can never be resolved against another buffer.
///
/// Cloning a buffer allocates a fresh ID for the clone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    /// Allocate a fresh, unique buffer ID.
    ///
    /// Each call returns a new ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(BUFFER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage generation of a buffer.
///
/// Starts at zero when the buffer is constructed and is incremented each
/// time the buffer's storage block is replaced. A checked reference is
/// live only while its captured generation equals the buffer's current
/// one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation of a freshly constructed buffer.
    pub const INITIAL: Self = Self(0);

    /// The generation that follows this one.
    ///
    /// Wraps on overflow; at one reallocation per nanosecond that takes
    /// several centuries.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Generation {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_ids_are_unique() {
        let a = BufferId::next();
        let b = BufferId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn generation_starts_at_zero() {
        assert_eq!(Generation::default(), Generation::INITIAL);
        assert_eq!(Generation::INITIAL.0, 0);
    }

    #[test]
    fn generation_next_increments() {
        assert_eq!(Generation(3).next(), Generation(4));
        assert_eq!(Generation(u64::MAX).next(), Generation(0));
    }

    #[test]
    fn display_is_raw_value() {
        assert_eq!(Generation(7).to_string(), "7");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_is_strictly_greater_below_max(g in 0u64..u64::MAX) {
                prop_assert!(Generation(g).next() > Generation(g));
            }
        }
    }
}
