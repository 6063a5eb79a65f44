//! Growable contiguous buffers with an explicit reference-invalidation
//! contract.
//!
//! A [`GrowableBuffer`] stores its elements in a single storage block.
//! When an append finds the block full, the buffer allocates a larger
//! block, moves every element across, releases the old block, and bumps
//! its storage [`Generation`]. Anything that pointed into the old block is
//! dead from that moment on.
//!
//! # Architecture
//!
//! ```text
//! GrowableBuffer<T, A> (owner)
//! ├── StorageBlock<T>     single live block, fixed logical capacity
//! ├── A: BlockAllocator   source of replacement blocks (SystemAllocator)
//! ├── BufferConfig        initial/max capacity + GrowthPolicy
//! └── BufferId + Generation stamped into every ElementRef<T>
//! ```
//!
//! # Two kinds of element access
//!
//! **Borrows** (`at`, `get`, `Index`, iterators) are checked by the
//! compiler. Holding one across an append is rejected at compile time:
//!
//! ```compile_fail,E0502
//! use growvec::GrowableBuffer;
//!
//! let mut buf = GrowableBuffer::new();
//! buf.append(1).unwrap();
//! buf.append(2).unwrap();
//! let first = buf.at(0).unwrap();
//! buf.append(3).unwrap(); // error[E0502]: `buf` is also borrowed as immutable
//! assert_eq!(*first, 1);
//! ```
//!
//! **Checked references** ([`ElementRef`]) borrow nothing and are
//! validated on every dereference. After a reallocation they resolve to
//! [`BufferError::StaleReference`] instead of reading released storage:
//!
//! ```
//! use growvec::{BufferError, GrowableBuffer};
//!
//! let mut buf = GrowableBuffer::new();
//! buf.append(1).unwrap();
//! buf.append(2).unwrap();
//! let first = buf.take_reference(0).unwrap();
//! assert_eq!(buf.resolve(first), Ok(&1));
//!
//! buf.append(3).unwrap(); // capacity 2 -> 4, storage replaced
//! assert!(matches!(
//!     buf.resolve(first),
//!     Err(BufferError::StaleReference { .. })
//! ));
//! ```
//!
//! Raw addresses into storage are never exposed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod alloc;
pub mod block;
pub mod buffer;
pub mod config;
pub mod growth;
pub mod handle;

// Public re-exports for the primary API surface.
pub use alloc::SystemAllocator;
pub use buffer::GrowableBuffer;
pub use config::BufferConfig;
pub use growth::GrowthPolicy;
pub use handle::ElementRef;

pub use growvec_core::{BlockAllocator, BufferError, BufferId, Generation};
