//! Checked element references.
//!
//! An [`ElementRef`] records where an element lived when the reference was
//! taken: the buffer's identity, its storage generation, and the index. It
//! borrows nothing, so it can be held across mutating calls, and every
//! dereference goes back through the buffer, which compares the captured
//! generation against its own in O(1).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use growvec_core::{BufferId, Generation};

/// Generation-stamped location of an element within a buffer.
///
/// Obtained from [`GrowableBuffer::take_reference`] and dereferenced with
/// [`GrowableBuffer::resolve`]. Once the buffer's storage block is
/// replaced, resolving fails with
/// [`BufferError::StaleReference`](growvec_core::BufferError::StaleReference)
/// instead of reading from released storage.
///
/// [`GrowableBuffer::take_reference`]: crate::GrowableBuffer::take_reference
/// [`GrowableBuffer::resolve`]: crate::GrowableBuffer::resolve
#[must_use]
pub struct ElementRef<T> {
    pub(crate) buffer: BufferId,
    pub(crate) generation: Generation,
    pub(crate) index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ElementRef<T> {
    pub(crate) fn new(buffer: BufferId, generation: Generation, index: usize) -> Self {
        Self {
            buffer,
            generation,
            index,
            _marker: PhantomData,
        }
    }

    /// The buffer this reference was taken from.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// The storage generation captured at creation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The element index.
    pub fn index(&self) -> usize {
        self.index
    }
}

// No `T` is stored, so none of these impls bound `T`.
impl<T> Clone for ElementRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ElementRef<T> {}

impl<T> PartialEq for ElementRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer
            && self.generation == other.generation
            && self.index == other.index
    }
}

impl<T> Eq for ElementRef<T> {}

impl<T> Hash for ElementRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.buffer.hash(state);
        self.generation.hash(state);
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for ElementRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("buffer", &self.buffer)
            .field("generation", &self.generation)
            .field("index", &self.index)
            .finish()
    }
}

impl<T> fmt::Display for ElementRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ElementRef(buf={}, gen={}, idx={})",
            self.buffer, self.generation, self.index
        )
    }
}
