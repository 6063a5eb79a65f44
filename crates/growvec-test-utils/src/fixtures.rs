//! Reusable allocator and element fixtures.
//!
//! - [`FailingAllocator`] — succeeds N times, then refuses every request.
//! - [`CountingAllocator`] — always succeeds, records requested capacities.
//! - [`Tracked`] / [`DropCounter`] — element type that counts its drops.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use growvec_core::BlockAllocator;

/// Allocates normally `succeed_count` times, then fails deterministically.
///
/// Useful for exercising the all-or-nothing growth path: after the
/// budget is spent every growth attempt reports an allocation failure.
pub struct FailingAllocator {
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingAllocator {
    /// Create an allocator that succeeds `succeed_count` times then fails.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `allocate()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Reset the call counter, restoring the full success budget.
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::Relaxed);
    }
}

impl BlockAllocator for FailingAllocator {
    fn allocate<T>(&self, capacity: usize) -> Option<Vec<T>> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return None;
        }
        Some(Vec::with_capacity(capacity))
    }
}

/// Always succeeds and records each requested capacity in order.
#[derive(Default)]
pub struct CountingAllocator {
    requests: RefCell<Vec<usize>>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacities requested so far, oldest first.
    pub fn requests(&self) -> Vec<usize> {
        self.requests.borrow().clone()
    }

    /// Number of blocks handed out.
    pub fn allocations(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl BlockAllocator for CountingAllocator {
    fn allocate<T>(&self, capacity: usize) -> Option<Vec<T>> {
        self.requests.borrow_mut().push(capacity);
        Some(Vec::with_capacity(capacity))
    }
}

/// Shared drop tally for [`Tracked`] values.
#[derive(Clone, Default)]
pub struct DropCounter(Arc<AtomicUsize>);

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracked value reporting to this counter.
    pub fn track(&self, value: u32) -> Tracked {
        Tracked {
            value,
            counter: self.clone(),
        }
    }

    /// Number of tracked values dropped so far.
    pub fn drops(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// A value that bumps its [`DropCounter`] exactly once when dropped.
pub struct Tracked {
    pub value: u32,
    counter: DropCounter,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counter.0.fetch_add(1, Ordering::Relaxed);
    }
}
