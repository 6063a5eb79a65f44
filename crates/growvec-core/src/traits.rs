//! The allocator seam used to obtain storage blocks.

/// Source of storage blocks for a growable buffer.
///
/// A buffer never lets its block grow on its own: every growth step asks
/// the allocator for a fresh block first, and only once that succeeds are
/// elements moved across and the old block released. Returning `None`
/// therefore leaves the buffer untouched and surfaces as
/// [`BufferError::AllocationFailure`](crate::BufferError::AllocationFailure).
///
/// Implementations must return an empty `Vec` whose `capacity()` is at
/// least `capacity`. A block that is too small is treated by the buffer
/// as a failed allocation.
pub trait BlockAllocator {
    /// Allocate an empty block able to hold `capacity` elements.
    ///
    /// Returns `None` if the block cannot be provided.
    fn allocate<T>(&self, capacity: usize) -> Option<Vec<T>>;
}

impl<A: BlockAllocator> BlockAllocator for &A {
    fn allocate<T>(&self, capacity: usize) -> Option<Vec<T>> {
        (**self).allocate(capacity)
    }
}
