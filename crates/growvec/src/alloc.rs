//! Default allocator backed by the global heap.

use growvec_core::BlockAllocator;

/// Obtains blocks from the global allocator.
///
/// Uses fallible reservation, so an out-of-memory condition or a
/// request larger than the platform allows is reported as `None`
/// instead of aborting the process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl BlockAllocator for SystemAllocator {
    fn allocate<T>(&self, capacity: usize) -> Option<Vec<T>> {
        let mut block = Vec::new();
        block.try_reserve_exact(capacity).ok()?;
        Some(block)
    }
}
