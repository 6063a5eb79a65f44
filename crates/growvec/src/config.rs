//! Buffer configuration parameters.

use growvec_core::BufferError;

use crate::growth::GrowthPolicy;

/// Configuration for a growable buffer.
///
/// Controls the initial block size, the hard capacity ceiling, and the
/// growth factor. Validated at construction; immutable for the lifetime
/// of the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferConfig {
    /// Capacity (in elements) of the block allocated at construction.
    ///
    /// Default: 0, meaning no block is allocated until the first append.
    pub initial_capacity: usize,

    /// Largest capacity the buffer will ever request.
    ///
    /// Growth that would exceed this is clamped to it; once the buffer is
    /// full at this capacity, further appends fail with
    /// [`BufferError::AllocationFailure`]. Must be at least 1 and at least
    /// `initial_capacity`.
    pub max_capacity: usize,

    /// Growth rule applied when an append finds the block full.
    pub growth: GrowthPolicy,
}

impl BufferConfig {
    /// Default initial capacity: no block until the first append.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 0;

    /// Default capacity ceiling. Matches the largest allocation size the
    /// standard library accepts for byte-sized elements.
    pub const DEFAULT_MAX_CAPACITY: usize = isize::MAX as usize;

    /// Create a config with the given initial capacity.
    ///
    /// Uses default values for all other parameters.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            max_capacity: Self::DEFAULT_MAX_CAPACITY,
            growth: GrowthPolicy::default(),
        }
    }

    /// Set the capacity ceiling.
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set the growth policy.
    #[must_use]
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Check the config for internal consistency.
    pub fn validate(&self) -> Result<(), BufferError> {
        if self.max_capacity == 0 {
            return Err(BufferError::InvalidConfig {
                reason: "max_capacity must be at least 1".into(),
            });
        }
        if self.initial_capacity > self.max_capacity {
            return Err(BufferError::InvalidConfig {
                reason: format!(
                    "initial_capacity ({}) exceeds max_capacity ({})",
                    self.initial_capacity, self.max_capacity,
                ),
            });
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_CAPACITY)
    }
}
