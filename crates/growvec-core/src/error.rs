//! Error types for growvec buffers.
//!
//! A single enum covers the whole buffer API: bounds failures, storage
//! growth failures, checked-reference failures, and configuration
//! rejection.

use std::error::Error;
use std::fmt;

use crate::id::{BufferId, Generation};

/// Errors that can occur during buffer operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// An index at or past the live length was requested.
    ///
    /// Recoverable; the buffer is not modified.
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The buffer's length at the time of the request.
        len: usize,
    },
    /// A growth step could not obtain a new storage block.
    ///
    /// The buffer is left exactly as it was before the attempt: same
    /// length, same capacity, same generation, same elements.
    AllocationFailure {
        /// Capacity (in elements) of the block that was requested.
        /// Saturates at `usize::MAX` when the request itself overflowed.
        requested_capacity: usize,
        /// Capacity of the block that remains in place.
        current_capacity: usize,
    },
    /// A checked element reference was used after the buffer's storage
    /// block was replaced.
    StaleReference {
        /// The generation captured in the reference.
        reference_generation: Generation,
        /// The buffer's generation at the time of the access.
        current_generation: Generation,
    },
    /// A checked element reference was resolved against a buffer other
    /// than the one it was taken from.
    ForeignReference {
        /// The buffer the reference was taken from.
        reference_buffer: BufferId,
        /// The buffer it was resolved against.
        buffer: BufferId,
    },
    /// A buffer configuration was rejected at construction.
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::AllocationFailure {
                requested_capacity,
                current_capacity,
            } => {
                write!(
                    f,
                    "allocation failure: could not grow storage from {current_capacity} \
                     to {requested_capacity} elements"
                )
            }
            Self::StaleReference {
                reference_generation,
                current_generation,
            } => {
                write!(
                    f,
                    "stale reference: taken at generation {reference_generation}, \
                     storage is at generation {current_generation}"
                )
            }
            Self::ForeignReference {
                reference_buffer,
                buffer,
            } => {
                write!(
                    f,
                    "reference from buffer {reference_buffer} resolved against buffer {buffer}"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid buffer config: {reason}"),
        }
    }
}

impl Error for BufferError {}
