//! The growable buffer and its reallocation contract.
//!
//! [`GrowableBuffer`] keeps its elements in one [`StorageBlock`]. Appending
//! into a full block replaces it with a larger one:
//!
//! 1. compute the next capacity from the [`GrowthPolicy`](crate::GrowthPolicy),
//!    clamped to `max_capacity`;
//! 2. obtain the new block from the allocator (failure leaves the buffer
//!    untouched);
//! 3. move every element across, keeping its index;
//! 4. release the old block and bump the buffer's [`Generation`].
//!
//! Plain borrows (`at`, `get`, `Index`, iterators) cannot outlive step 4:
//! every mutating method takes `&mut self`, so the compiler rejects the
//! overlap. Checked [`ElementRef`]s can be held across mutation and are
//! rejected at dereference time once the generation moves on.

use std::fmt;
use std::ops::{Index, IndexMut};

use growvec_core::{BlockAllocator, BufferError, BufferId, Generation};
use tracing::{debug, trace, warn};

use crate::alloc::SystemAllocator;
use crate::block::StorageBlock;
use crate::config::BufferConfig;
use crate::handle::ElementRef;

/// A contiguous, growable sequence of `T` with an explicit invalidation
/// contract.
///
/// # Reference validity
///
/// | operation | replaces storage? |
/// |-----------|-------------------|
/// | `append` with `len < capacity` | no |
/// | `append` with `len == capacity` | yes |
/// | `reserve(n)` with `len + n > capacity` | yes |
/// | `shrink_to_fit` with `len < capacity` | yes |
/// | `pop`, `truncate`, `clear` | no |
///
/// Replacing storage invalidates every [`ElementRef`] taken earlier.
/// Removing elements without replacing storage leaves references to the
/// surviving positions live.
///
/// # Thread safety
///
/// No internal synchronisation. Mutation needs `&mut self`; share across
/// threads behind a lock if needed.
pub struct GrowableBuffer<T, A = SystemAllocator> {
    /// The single live storage block.
    block: StorageBlock<T>,
    /// Source of replacement blocks.
    allocator: A,
    /// Growth settings, validated at construction.
    config: BufferConfig,
    /// Identity stamped into every reference taken from this buffer.
    id: BufferId,
    /// Incremented each time `block` is replaced.
    generation: Generation,
    /// Reallocations that enlarged the block.
    growth_events: u64,
}

impl<T> GrowableBuffer<T> {
    /// Create an empty buffer with no storage block.
    ///
    /// The first append allocates a block of capacity 1.
    pub fn new() -> Self {
        Self::new_in(SystemAllocator)
    }

    /// Create an empty buffer with a block of `initial_capacity` elements.
    pub fn with_capacity(initial_capacity: usize) -> Result<Self, BufferError> {
        Self::with_config(BufferConfig::new(initial_capacity))
    }

    /// Create an empty buffer from a config.
    ///
    /// Returns `Err(BufferError::InvalidConfig)` if the config fails
    /// validation, or `Err(BufferError::AllocationFailure)` if the
    /// initial block cannot be allocated.
    pub fn with_config(config: BufferConfig) -> Result<Self, BufferError> {
        Self::with_config_in(config, SystemAllocator)
    }
}

impl<T, A: BlockAllocator> GrowableBuffer<T, A> {
    /// Create an empty buffer with no storage block, using `allocator`
    /// for all future blocks.
    pub fn new_in(allocator: A) -> Self {
        Self {
            block: StorageBlock::empty(),
            allocator,
            config: BufferConfig::default(),
            id: BufferId::next(),
            generation: Generation::INITIAL,
            growth_events: 0,
        }
    }

    /// Create an empty buffer from a config, using `allocator` for the
    /// initial block and all future blocks.
    pub fn with_config_in(config: BufferConfig, allocator: A) -> Result<Self, BufferError> {
        config.validate()?;
        let Some(block) = StorageBlock::allocate(&allocator, config.initial_capacity) else {
            warn!(
                initial_capacity = config.initial_capacity,
                "initial storage block allocation failed"
            );
            return Err(BufferError::AllocationFailure {
                requested_capacity: config.initial_capacity,
                current_capacity: 0,
            });
        };
        Ok(Self {
            block,
            allocator,
            config,
            id: BufferId::next(),
            generation: Generation::INITIAL,
            growth_events: 0,
        })
    }

    /// Append `value` at index `len()`.
    ///
    /// If the block is full it is replaced first, invalidating every
    /// [`ElementRef`] taken from this buffer. On
    /// `Err(BufferError::AllocationFailure)` the buffer is unchanged and
    /// `value` is dropped.
    pub fn append(&mut self, value: T) -> Result<(), BufferError> {
        if self.block.is_full() {
            self.grow()?;
        }
        self.block.push(value);
        Ok(())
    }

    /// Append every item of `iter` in order.
    ///
    /// Stops at the first failure; items appended before it are kept.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<(), BufferError> {
        for value in iter {
            self.append(value)?;
        }
        Ok(())
    }

    /// The element at `index`.
    ///
    /// Returns `Err(BufferError::IndexOutOfRange)` if `index >= len()`.
    /// The returned borrow keeps the buffer immutable for as long as it
    /// lives.
    pub fn at(&self, index: usize) -> Result<&T, BufferError> {
        self.block
            .as_slice()
            .get(index)
            .ok_or(BufferError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// The element at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.block.as_slice().get(index)
    }

    /// The element at `index` mutably, or `None` if out of range.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.block.as_mut_slice().get_mut(index)
    }

    /// Take a checked reference to the element at `index`.
    ///
    /// The reference stays resolvable until the storage block is next
    /// replaced. Returns `Err(BufferError::IndexOutOfRange)` if
    /// `index >= len()`.
    pub fn take_reference(&self, index: usize) -> Result<ElementRef<T>, BufferError> {
        if index >= self.len() {
            return Err(BufferError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(ElementRef::new(self.id, self.generation, index))
    }

    /// Dereference a checked reference.
    ///
    /// # Errors
    ///
    /// - `ForeignReference` if it was taken from another buffer.
    /// - `StaleReference` if the storage block was replaced since.
    /// - `IndexOutOfRange` if the element was removed since.
    pub fn resolve(&self, reference: ElementRef<T>) -> Result<&T, BufferError> {
        let index = self.check(reference)?;
        Ok(&self.block.as_slice()[index])
    }

    /// Dereference a checked reference mutably.
    ///
    /// Fails under the same conditions as [`resolve`](Self::resolve).
    pub fn resolve_mut(&mut self, reference: ElementRef<T>) -> Result<&mut T, BufferError> {
        let index = self.check(reference)?;
        Ok(&mut self.block.as_mut_slice()[index])
    }

    /// Whether [`resolve`](Self::resolve) would succeed.
    pub fn is_live(&self, reference: ElementRef<T>) -> bool {
        reference.buffer == self.id
            && reference.generation == self.generation
            && reference.index < self.len()
    }

    fn check(&self, reference: ElementRef<T>) -> Result<usize, BufferError> {
        if reference.buffer != self.id {
            trace!(buffer = %self.id, reference = %reference, "foreign reference rejected");
            return Err(BufferError::ForeignReference {
                reference_buffer: reference.buffer,
                buffer: self.id,
            });
        }
        if reference.generation != self.generation {
            trace!(
                buffer = %self.id,
                reference = %reference,
                current_generation = %self.generation,
                "stale reference rejected"
            );
            return Err(BufferError::StaleReference {
                reference_generation: reference.generation,
                current_generation: self.generation,
            });
        }
        if reference.index >= self.len() {
            return Err(BufferError::IndexOutOfRange {
                index: reference.index,
                len: self.len(),
            });
        }
        Ok(reference.index)
    }

    /// Remove and return the last element. Never replaces storage.
    pub fn pop(&mut self) -> Option<T> {
        self.block.pop()
    }

    /// Drop all elements at positions `len..`. Never replaces storage.
    pub fn truncate(&mut self, len: usize) {
        self.block.truncate(len);
    }

    /// Drop all elements. Never replaces storage.
    pub fn clear(&mut self) {
        self.block.truncate(0);
    }

    /// Ensure room for at least `additional` more elements without a
    /// further reallocation.
    ///
    /// Replaces storage (invalidating references) only if the current
    /// block is too small. The new capacity is the larger of the policy's
    /// next step and `len() + additional`, clamped to `max_capacity`.
    pub fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        let current = self.capacity();
        let Some(needed) = self.len().checked_add(additional) else {
            return Err(BufferError::AllocationFailure {
                requested_capacity: usize::MAX,
                current_capacity: current,
            });
        };
        if needed <= current {
            return Ok(());
        }
        if needed > self.config.max_capacity {
            warn!(
                buffer = %self.id,
                needed,
                max_capacity = self.config.max_capacity,
                "reserve exceeds capacity ceiling"
            );
            return Err(BufferError::AllocationFailure {
                requested_capacity: needed,
                current_capacity: current,
            });
        }
        let geometric = self.config.growth.next_capacity(current).unwrap_or(needed);
        let target = geometric.max(needed).min(self.config.max_capacity);
        self.replace_block(target, "reserve")?;
        self.growth_events += 1;
        Ok(())
    }

    /// Replace storage with a block exactly `len()` elements large.
    ///
    /// A no-op when the block is already full. Otherwise invalidates
    /// every outstanding reference.
    pub fn shrink_to_fit(&mut self) -> Result<(), BufferError> {
        if self.block.is_full() {
            return Ok(());
        }
        self.replace_block(self.len(), "shrink")
    }

    fn grow(&mut self) -> Result<(), BufferError> {
        let current = self.capacity();
        let next = self.config.growth.next_capacity(current);
        let target = next.map_or(self.config.max_capacity, |c| c.min(self.config.max_capacity));
        if target <= current {
            let requested_capacity = next.unwrap_or(usize::MAX);
            warn!(
                buffer = %self.id,
                current_capacity = current,
                requested_capacity,
                max_capacity = self.config.max_capacity,
                "buffer full at capacity ceiling"
            );
            return Err(BufferError::AllocationFailure {
                requested_capacity,
                current_capacity: current,
            });
        }
        self.replace_block(target, "append")?;
        self.growth_events += 1;
        Ok(())
    }

    /// Swap in a fresh block of `new_capacity`, moving every element.
    ///
    /// All-or-nothing: the allocation happens before anything is touched.
    fn replace_block(
        &mut self,
        new_capacity: usize,
        reason: &'static str,
    ) -> Result<(), BufferError> {
        let old_capacity = self.capacity();
        let Some(mut next) = StorageBlock::allocate(&self.allocator, new_capacity) else {
            warn!(
                buffer = %self.id,
                old_capacity,
                new_capacity,
                reason,
                "storage block allocation failed"
            );
            return Err(BufferError::AllocationFailure {
                requested_capacity: new_capacity,
                current_capacity: old_capacity,
            });
        };
        self.block.move_into(&mut next);
        // The old block is empty now; dropping it releases its storage.
        drop(std::mem::replace(&mut self.block, next));
        self.generation = self.generation.next();
        debug!(
            buffer = %self.id,
            old_capacity,
            new_capacity,
            generation = %self.generation,
            reason,
            "storage block replaced"
        );
        Ok(())
    }
}

impl<T, A> GrowableBuffer<T, A> {
    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Capacity of the current storage block in elements.
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// Appends that will succeed without replacing storage.
    pub fn remaining(&self) -> usize {
        self.block.remaining()
    }

    /// Current storage generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of reallocations that enlarged the storage block.
    pub fn growth_events(&self) -> u64 {
        self.growth_events
    }

    /// This buffer's identity.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The config this buffer was built with.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// The allocator providing storage blocks.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Size of the current storage block in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.block.memory_bytes()
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        self.block.as_slice()
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.block.as_mut_slice()
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.block.as_slice().iter()
    }

    /// Iterate over the elements mutably.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.block.as_mut_slice().iter_mut()
    }

    /// Consume the buffer, returning its elements.
    pub fn into_vec(self) -> Vec<T> {
        self.block.into_vec()
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: BlockAllocator + Clone> Clone for GrowableBuffer<T, A> {
    /// Clone into a block sized to `len()`.
    ///
    /// The clone has a fresh identity, so references taken from `self`
    /// never resolve against it.
    ///
    /// # Panics
    ///
    /// Panics if the allocator cannot provide the block.
    fn clone(&self) -> Self {
        let len = self.len();
        let Some(mut block) = StorageBlock::allocate(&self.allocator, len) else {
            panic!("allocation failure while cloning buffer of {len} elements");
        };
        for value in self.as_slice() {
            block.push(value.clone());
        }
        Self {
            block,
            allocator: self.allocator.clone(),
            config: self.config.clone(),
            id: BufferId::next(),
            generation: Generation::INITIAL,
            growth_events: 0,
        }
    }
}

impl<T: fmt::Debug, A> fmt::Debug for GrowableBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("id", &self.id)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("generation", &self.generation)
            .field("elements", &self.as_slice())
            .finish()
    }
}

impl<T, A> Index<usize> for GrowableBuffer<T, A> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= len()`. Use [`GrowableBuffer::at`] for a
    /// checked lookup.
    fn index(&self, index: usize) -> &T {
        &self.block.as_slice()[index]
    }
}

impl<T, A> IndexMut<usize> for GrowableBuffer<T, A> {
    /// # Panics
    ///
    /// Panics if `index >= len()`. Use [`GrowableBuffer::get_mut`] for a
    /// checked lookup.
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.block.as_mut_slice()[index]
    }
}

impl<T, A> AsRef<[T]> for GrowableBuffer<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<'a, T, A> IntoIterator for &'a GrowableBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A> IntoIterator for &'a mut GrowableBuffer<T, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A> IntoIterator for GrowableBuffer<T, A> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<T, A: BlockAllocator> Extend<T> for GrowableBuffer<T, A> {
    /// # Panics
    ///
    /// Panics on allocation failure. Use
    /// [`GrowableBuffer::try_extend`] to handle it.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("extend failed: {err}");
        }
    }
}

impl<T> FromIterator<T> for GrowableBuffer<T> {
    /// # Panics
    ///
    /// Panics on allocation failure.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buffer = Self::new();
        buffer.extend(iter);
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::GrowthPolicy;
    use growvec_test_utils::{CountingAllocator, FailingAllocator};

    fn filled(values: &[i32]) -> GrowableBuffer<i32> {
        let mut buf = GrowableBuffer::new();
        for &v in values {
            buf.append(v).unwrap();
        }
        buf
    }

    #[test]
    fn new_buffer_has_no_block() {
        let buf: GrowableBuffer<u32> = GrowableBuffer::new();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.generation(), Generation::INITIAL);
        assert_eq!(buf.memory_bytes(), 0);
    }

    #[test]
    fn with_capacity_allocates_block() {
        let buf: GrowableBuffer<u64> = GrowableBuffer::with_capacity(4).unwrap();
        assert_eq!(buf.capacity(), 4);
        assert!(buf.is_empty());
        assert_eq!(buf.memory_bytes(), 32);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = BufferConfig::new(10).with_max_capacity(5);
        let result: Result<GrowableBuffer<u8>, _> = GrowableBuffer::with_config(config);
        assert!(matches!(result, Err(BufferError::InvalidConfig { .. })));
    }

    #[test]
    fn initial_allocation_failure_reported() {
        let result: Result<GrowableBuffer<u8, _>, _> =
            GrowableBuffer::with_config_in(BufferConfig::new(4), FailingAllocator::new(0));
        assert_eq!(
            result.unwrap_err(),
            BufferError::AllocationFailure {
                requested_capacity: 4,
                current_capacity: 0,
            }
        );
    }

    #[test]
    fn growth_from_empty_follows_doubling() {
        let alloc = CountingAllocator::new();
        let mut buf = GrowableBuffer::new_in(&alloc);
        for v in 0..9 {
            buf.append(v).unwrap();
        }
        assert_eq!(alloc.requests(), vec![1, 2, 4, 8, 16]);
        assert_eq!(buf.capacity(), 16);
        assert_eq!(buf.growth_events(), 5);
        assert_eq!(buf.generation(), Generation(5));
    }

    #[test]
    fn three_halves_policy_sequence() {
        let alloc = CountingAllocator::new();
        let config = BufferConfig::new(0).with_growth(GrowthPolicy::ThreeHalves);
        let mut buf = GrowableBuffer::with_config_in(config, &alloc).unwrap();
        for v in 0..7 {
            buf.append(v).unwrap();
        }
        assert_eq!(alloc.requests(), vec![1, 2, 3, 5, 8]);
    }

    #[test]
    fn at_out_of_range() {
        let buf = filled(&[1, 2]);
        assert_eq!(buf.at(1), Ok(&2));
        assert_eq!(
            buf.at(2),
            Err(BufferError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn take_reference_out_of_range() {
        let buf = filled(&[1]);
        assert!(matches!(
            buf.take_reference(1),
            Err(BufferError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn reference_survives_append_below_capacity() {
        let mut buf = GrowableBuffer::with_capacity(4).unwrap();
        buf.append(10).unwrap();
        let r = buf.take_reference(0).unwrap();
        buf.append(20).unwrap();
        buf.append(30).unwrap();
        buf.append(40).unwrap();
        assert_eq!(buf.resolve(r), Ok(&10));
        assert_eq!(buf.growth_events(), 0);
    }

    #[test]
    fn reference_goes_stale_on_growth() {
        let mut buf = filled(&[1, 2]);
        let r = buf.take_reference(0).unwrap();
        buf.append(3).unwrap();
        assert_eq!(
            buf.resolve(r),
            Err(BufferError::StaleReference {
                reference_generation: Generation(2),
                current_generation: Generation(3),
            })
        );
        assert!(!buf.is_live(r));
    }

    #[test]
    fn resolve_mut_writes_through() {
        let mut buf = filled(&[1, 2, 3]);
        let r = buf.take_reference(1).unwrap();
        *buf.resolve_mut(r).unwrap() = 20;
        assert_eq!(buf.as_slice(), &[1, 20, 3]);
    }

    #[test]
    fn foreign_reference_rejected() {
        let a = filled(&[1]);
        let b = filled(&[1]);
        let r = a.take_reference(0).unwrap();
        assert!(matches!(
            b.resolve(r),
            Err(BufferError::ForeignReference { .. })
        ));
    }

    #[test]
    fn pop_invalidates_only_removed_position() {
        let mut buf = GrowableBuffer::with_capacity(4).unwrap();
        buf.try_extend([1, 2, 3]).unwrap();
        let first = buf.take_reference(0).unwrap();
        let last = buf.take_reference(2).unwrap();
        assert_eq!(buf.pop(), Some(3));
        assert_eq!(buf.resolve(first), Ok(&1));
        assert_eq!(
            buf.resolve(last),
            Err(BufferError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn clear_keeps_block_and_generation() {
        let mut buf = filled(&[1, 2, 3]);
        let gen = buf.generation();
        let cap = buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), cap);
        assert_eq!(buf.generation(), gen);
    }

    #[test]
    fn truncate_drops_tail() {
        let mut buf = filled(&[1, 2, 3, 4]);
        buf.truncate(2);
        assert_eq!(buf.as_slice(), &[1, 2]);
        buf.truncate(10);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn reserve_within_capacity_is_noop() {
        let mut buf: GrowableBuffer<u8> = GrowableBuffer::with_capacity(8).unwrap();
        buf.reserve(8).unwrap();
        assert_eq!(buf.generation(), Generation::INITIAL);
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn reserve_takes_larger_of_policy_and_need() {
        let mut buf = filled(&[1, 2]);
        buf.reserve(1).unwrap();
        assert_eq!(buf.capacity(), 4);
        buf.reserve(10).unwrap();
        assert_eq!(buf.capacity(), 12);
        assert_eq!(buf.as_slice(), &[1, 2]);
    }

    #[test]
    fn reserve_that_reallocates_stales_references() {
        let mut buf = filled(&[1, 2]);
        let r = buf.take_reference(1).unwrap();
        let gen = buf.generation();
        let events = buf.growth_events();

        buf.reserve(3).unwrap();

        assert_eq!(buf.generation(), gen.next());
        assert_eq!(buf.growth_events(), events + 1);
        assert_eq!(
            buf.resolve(r),
            Err(BufferError::StaleReference {
                reference_generation: gen,
                current_generation: gen.next(),
            })
        );
        assert_eq!(buf.as_slice(), &[1, 2]);
    }

    #[test]
    fn reserve_that_fits_keeps_references_live() {
        let mut buf: GrowableBuffer<i32> = GrowableBuffer::with_capacity(8).unwrap();
        buf.try_extend([1, 2, 3]).unwrap();
        let r = buf.take_reference(2).unwrap();

        buf.reserve(5).unwrap();

        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.generation(), Generation::INITIAL);
        assert_eq!(buf.growth_events(), 0);
        assert_eq!(buf.resolve(r), Ok(&3));
    }

    #[test]
    fn reserve_beyond_ceiling_fails() {
        let config = BufferConfig::new(2).with_max_capacity(4);
        let mut buf: GrowableBuffer<u8> = GrowableBuffer::with_config(config).unwrap();
        assert_eq!(
            buf.reserve(5),
            Err(BufferError::AllocationFailure {
                requested_capacity: 5,
                current_capacity: 2,
            })
        );
        buf.reserve(3).unwrap();
        assert_eq!(buf.capacity(), 4);
    }

    #[test]
    fn reserve_overflow_fails() {
        let mut buf = filled(&[1]);
        assert!(matches!(
            buf.reserve(usize::MAX),
            Err(BufferError::AllocationFailure {
                requested_capacity: usize::MAX,
                ..
            })
        ));
    }

    #[test]
    fn shrink_to_fit_replaces_block() {
        let mut buf: GrowableBuffer<i32> = GrowableBuffer::with_capacity(8).unwrap();
        buf.try_extend([1, 2, 3]).unwrap();
        let r = buf.take_reference(0).unwrap();
        buf.shrink_to_fit().unwrap();
        assert_eq!(buf.capacity(), 3);
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
        assert!(matches!(
            buf.resolve(r),
            Err(BufferError::StaleReference { .. })
        ));
        assert_eq!(buf.growth_events(), 0);
    }

    #[test]
    fn shrink_to_fit_when_full_is_noop() {
        let mut buf = filled(&[1, 2]);
        let gen = buf.generation();
        buf.shrink_to_fit().unwrap();
        assert_eq!(buf.generation(), gen);
    }

    #[test]
    fn max_capacity_clamps_growth() {
        let config = BufferConfig::new(4).with_max_capacity(6);
        let mut buf = GrowableBuffer::with_config(config).unwrap();
        buf.try_extend(0..6).unwrap();
        assert_eq!(buf.capacity(), 6);
        let err = buf.append(6).unwrap_err();
        assert_eq!(
            err,
            BufferError::AllocationFailure {
                requested_capacity: 12,
                current_capacity: 6,
            }
        );
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn allocation_failure_is_atomic() {
        let mut buf = GrowableBuffer::with_config_in(BufferConfig::new(2), FailingAllocator::new(1))
            .unwrap();
        buf.append(1).unwrap();
        buf.append(2).unwrap();
        let r = buf.take_reference(1).unwrap();
        let gen = buf.generation();

        let err = buf.append(3).unwrap_err();
        assert_eq!(
            err,
            BufferError::AllocationFailure {
                requested_capacity: 4,
                current_capacity: 2,
            }
        );
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.capacity(), 2);
        assert_eq!(buf.generation(), gen);
        assert_eq!(buf.as_slice(), &[1, 2]);
        assert_eq!(buf.resolve(r), Ok(&2));
        assert_eq!(buf.growth_events(), 0);
    }

    #[test]
    fn try_extend_keeps_prefix_on_failure() {
        let mut buf = GrowableBuffer::new_in(FailingAllocator::new(2));
        let err = buf.try_extend(1..=5).unwrap_err();
        assert!(matches!(err, BufferError::AllocationFailure { .. }));
        assert_eq!(buf.as_slice(), &[1, 2]);
    }

    #[test]
    #[should_panic(expected = "extend failed")]
    fn extend_panics_on_failure() {
        let mut buf = GrowableBuffer::new_in(FailingAllocator::new(0));
        buf.extend([1]);
    }

    #[test]
    fn collect_and_iterate() {
        let mut buf: GrowableBuffer<i32> = (0..10).collect();
        assert_eq!(buf.len(), 10);
        assert_eq!(buf[1], 1);
        for v in &mut buf {
            *v *= 2;
        }
        let doubled: Vec<i32> = buf.iter().copied().collect();
        assert_eq!(doubled, (0..20).step_by(2).collect::<Vec<_>>());
        let owned: Vec<i32> = buf.into_iter().collect();
        assert_eq!(owned.len(), 10);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn index_past_len_panics() {
        let buf = filled(&[1, 2, 3]);
        let _value = buf[3];
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn index_mut_past_len_panics() {
        let mut buf = filled(&[1, 2, 3]);
        assert_eq!(buf.capacity(), 4);
        buf[3] = 4;
    }

    #[test]
    fn index_mut_writes() {
        let mut buf = filled(&[1, 2]);
        buf[0] = 5;
        *buf.get_mut(1).unwrap() = 6;
        assert_eq!(buf.as_slice(), &[5, 6]);
        assert!(buf.get(2).is_none());
    }

    #[test]
    fn clone_is_tight_and_fresh() {
        let buf = filled(&[1, 2, 3]);
        let r = buf.take_reference(0).unwrap();
        let copy = buf.clone();
        assert_eq!(copy.as_slice(), buf.as_slice());
        assert_eq!(copy.capacity(), 3);
        assert_ne!(copy.id(), buf.id());
        assert!(matches!(
            copy.resolve(r),
            Err(BufferError::ForeignReference { .. })
        ));
    }

    #[test]
    fn debug_lists_elements() {
        let buf = filled(&[7]);
        let s = format!("{buf:?}");
        assert!(s.contains("elements: [7]"));
        assert!(s.contains("capacity: 1"));
    }

    #[test]
    fn zero_sized_elements() {
        let mut buf = GrowableBuffer::new();
        for _ in 0..5 {
            buf.append(()).unwrap();
        }
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.memory_bytes(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_append_is_readable(values in proptest::collection::vec(any::<i64>(), 0..300)) {
                let mut buf = GrowableBuffer::new();
                for &v in &values {
                    buf.append(v).unwrap();
                }
                prop_assert_eq!(buf.len(), values.len());
                for (i, v) in values.iter().enumerate() {
                    prop_assert_eq!(buf.at(i), Ok(v));
                }
            }

            #[test]
            fn length_never_exceeds_capacity(n in 0usize..300, initial in 0usize..16) {
                let mut buf = GrowableBuffer::with_capacity(initial).unwrap();
                for i in 0..n {
                    buf.append(i).unwrap();
                    prop_assert!(buf.len() <= buf.capacity());
                }
            }

            #[test]
            fn filling_past_capacity_grows_once(
                initial in 0usize..64,
                prefill_frac in 0.0f64..1.0,
            ) {
                let mut buf = GrowableBuffer::with_capacity(initial).unwrap();
                let prefill = (initial as f64 * prefill_frac) as usize;
                for i in 0..prefill {
                    buf.append(i).unwrap();
                }
                let before: Vec<usize> = buf.as_slice().to_vec();
                let old_capacity = buf.capacity();
                let old_generation = buf.generation();

                for i in 0..(old_capacity - prefill + 1) {
                    buf.append(prefill + i).unwrap();
                }

                prop_assert_eq!(buf.growth_events(), 1);
                prop_assert_eq!(buf.generation(), old_generation.next());
                prop_assert!(buf.capacity() >= old_capacity + 1);
                prop_assert_eq!(&buf.as_slice()[..prefill], before.as_slice());
            }

            #[test]
            fn reference_liveness_tracks_generation(
                initial in 1usize..32,
                extra in 0usize..64,
            ) {
                let mut buf = GrowableBuffer::with_capacity(initial).unwrap();
                buf.append(0usize).unwrap();
                let r = buf.take_reference(0).unwrap();
                for i in 0..extra {
                    buf.append(i + 1).unwrap();
                }
                let grew = 1 + extra > initial;
                prop_assert_eq!(buf.is_live(r), !grew);
                prop_assert_eq!(buf.resolve(r).is_ok(), !grew);
            }
        }
    }
}
