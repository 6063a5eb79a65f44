//! Core types and traits for the growvec workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the buffer implementation and its test
//! fixtures: buffer identity and generation counters, the error
//! taxonomy, and the [`BlockAllocator`] seam through which storage
//! blocks are obtained.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::BufferError;
pub use id::{BufferId, Generation};
pub use traits::BlockAllocator;
