//! Fixed-capacity contiguous storage blocks.
//!
//! A [`StorageBlock`] is a `Vec<T>` whose capacity is reserved up front and
//! never exceeded: pushes past the block's capacity are refused rather than
//! letting the vector reallocate behind the buffer's back. Replacing a block
//! is always an explicit step performed by the owning buffer.

use growvec_core::BlockAllocator;

/// A single contiguous block holding elements at positions `[0, len)`.
///
/// The block's logical `capacity` is the size the allocator was asked
/// for. The backing vector may have reserved more, but the block never
/// uses it, so the elements never move while the block is alive.
pub struct StorageBlock<T> {
    /// Backing storage. Reserved to at least `capacity` at creation.
    data: Vec<T>,
    /// Logical capacity in elements.
    capacity: usize,
}

impl<T> StorageBlock<T> {
    /// A zero-capacity block. Holds no allocation.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            capacity: 0,
        }
    }

    /// Obtain a block of `capacity` elements from `allocator`.
    ///
    /// A zero capacity never calls the allocator. Returns `None` if the
    /// allocator fails or hands back a block that is non-empty or smaller
    /// than requested.
    pub fn allocate<A: BlockAllocator>(allocator: &A, capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return Some(Self::empty());
        }
        let data = allocator.allocate::<T>(capacity)?;
        if !data.is_empty() || data.capacity() < capacity {
            return None;
        }
        Some(Self { data, capacity })
    }

    /// Append `value` into the next free slot.
    ///
    /// # Panics
    ///
    /// Panics if the block is full.
    pub fn push(&mut self, value: T) {
        assert!(
            self.data.len() < self.capacity,
            "push into full storage block (capacity {})",
            self.capacity,
        );
        self.data.push(value);
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Drop all elements at positions `len..`.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Move every element into `dst`, preserving order.
    ///
    /// Elements land in `dst` at their current index offset by `dst.len()`;
    /// callers pass an empty `dst` to keep positions identical.
    ///
    /// # Panics
    ///
    /// Panics if `dst` lacks room for all elements.
    pub fn move_into(&mut self, dst: &mut StorageBlock<T>) {
        assert!(
            dst.remaining() >= self.data.len(),
            "destination block has {} free slots, {} elements to move",
            dst.remaining(),
            self.data.len(),
        );
        dst.data.append(&mut self.data);
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the block, returning its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the block holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical capacity in elements.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots left before the block is full.
    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Whether the next push would be refused.
    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    /// Size of the logical block in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.capacity * std::mem::size_of::<T>()
    }
}
