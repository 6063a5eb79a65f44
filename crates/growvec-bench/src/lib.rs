//! Benchmark profiles for growvec buffers.
//!
//! - [`BenchProfile::from_empty`]: no initial block, every growth step taken
//! - [`BenchProfile::preallocated`]: block sized for the whole run, no growth
//! - [`fill`]: build a buffer from a profile with a deterministic workload

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use growvec::{BufferConfig, BufferError, GrowableBuffer, GrowthPolicy};

/// Shape of an append workload.
#[derive(Clone, Copy, Debug)]
pub struct BenchProfile {
    /// Capacity of the block allocated up front.
    pub initial_capacity: usize,
    /// Number of values appended.
    pub appends: usize,
    /// Growth factor under test.
    pub growth: GrowthPolicy,
}

impl BenchProfile {
    /// Start from an empty buffer and let growth do all the work.
    pub fn from_empty(appends: usize, growth: GrowthPolicy) -> Self {
        Self {
            initial_capacity: 0,
            appends,
            growth,
        }
    }

    /// Preallocate exactly `appends` slots so no growth occurs.
    pub fn preallocated(appends: usize) -> Self {
        Self {
            initial_capacity: appends,
            appends,
            growth: GrowthPolicy::Doubling,
        }
    }

    /// The config matching this profile.
    pub fn config(&self) -> BufferConfig {
        BufferConfig::new(self.initial_capacity).with_growth(self.growth)
    }
}

/// Build a buffer and append `profile.appends` values to it.
///
/// The i-th value is `i * 0x9E37_79B9_7F4A_7C15` (wrapping).
pub fn fill(profile: &BenchProfile) -> Result<GrowableBuffer<u64>, BufferError> {
    let mut buf = GrowableBuffer::with_config(profile.config())?;
    for i in 0..profile.appends as u64 {
        buf.append(i.wrapping_mul(0x9E37_79B9_7F4A_7C15))?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_empty_profile_grows() {
        let buf = fill(&BenchProfile::from_empty(1000, GrowthPolicy::Doubling)).unwrap();
        assert_eq!(buf.len(), 1000);
        assert_eq!(buf.capacity(), 1024);
        assert_eq!(buf.growth_events(), 11);
    }

    #[test]
    fn preallocated_profile_never_grows() {
        let buf = fill(&BenchProfile::preallocated(1000)).unwrap();
        assert_eq!(buf.len(), 1000);
        assert_eq!(buf.growth_events(), 0);
    }

    #[test]
    fn workload_is_deterministic() {
        let profile = BenchProfile::from_empty(64, GrowthPolicy::ThreeHalves);
        let a = fill(&profile).unwrap();
        let b = fill(&profile).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }
}
