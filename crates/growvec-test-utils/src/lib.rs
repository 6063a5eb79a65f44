//! Test utilities for growvec development.
//!
//! Provides [`BlockAllocator`](growvec_core::BlockAllocator) fixtures for
//! driving growth paths deterministically, plus a drop-counting element
//! type for checking that reallocation moves values without duplicating
//! or leaking them.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CountingAllocator, DropCounter, FailingAllocator, Tracked};
