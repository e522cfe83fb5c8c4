//! Test doubles for chunkalloc development.
//!
//! Provides [`RecordingAllocator`], an [`ElementAllocator`] that forwards
//! to the global heap and writes every call into a shared
//! [`AllocationLog`]. Containers under test can be checked for leaks and
//! for the newest-first release order stack allocators rely on, without
//! the hard failure a chunk arena would produce.
//!
//! [`RejectingAllocator`] reports a fixed error on every release, for
//! exercising the error paths of container teardown.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use chunkalloc_arena::{AllocError, ElementAllocator, HeapAllocator};
use indexmap::IndexMap;

/// One allocator call, as seen by a [`RecordingAllocator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocEvent {
    Allocate { addr: usize, n: usize },
    Deallocate { addr: usize, n: usize },
}

/// Shared record of every call made through a family of
/// [`RecordingAllocator`]s.
///
/// Live blocks are kept in allocation order, so the last entry is always
/// the top of the stack a stack allocator would see.
#[derive(Debug, Default)]
pub struct AllocationLog {
    /// Live blocks: address → element count, oldest first.
    live: IndexMap<usize, usize>,
    events: Vec<AllocEvent>,
    out_of_order: usize,
}

impl AllocationLog {
    /// Number of blocks allocated and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether every allocated block has been released.
    pub fn is_balanced(&self) -> bool {
        self.live.is_empty()
    }

    /// Releases of a block that was not the most recent live one.
    pub fn out_of_order_releases(&self) -> usize {
        self.out_of_order
    }

    /// Every call, in order.
    pub fn events(&self) -> &[AllocEvent] {
        &self.events
    }

    /// Number of allocate calls recorded.
    pub fn allocations(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AllocEvent::Allocate { .. }))
            .count()
    }

    /// Number of deallocate calls recorded.
    pub fn deallocations(&self) -> usize {
        self.events.len() - self.allocations()
    }
}

/// Heap-backed [`ElementAllocator`] that records every call.
///
/// Rebinding keeps writing to the same log, so a container that rebinds
/// to its node type is still observed. Zero-length requests are not
/// recorded. Zero-sized element types are not supported: all their
/// blocks share one address.
pub struct RecordingAllocator<T> {
    inner: HeapAllocator<T>,
    log: Rc<RefCell<AllocationLog>>,
}

impl<T> RecordingAllocator<T> {
    /// Create an allocator with an empty log of its own.
    pub fn new() -> Self {
        Self {
            inner: HeapAllocator::new(),
            log: Rc::new(RefCell::new(AllocationLog::default())),
        }
    }

    /// Handle to the log, usable after the allocator has been moved into
    /// a container.
    pub fn shared_log(&self) -> Rc<RefCell<AllocationLog>> {
        Rc::clone(&self.log)
    }
}

impl<T> Default for RecordingAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ElementAllocator<T> for RecordingAllocator<T> {
    type Rebind<U> = RecordingAllocator<U>;

    fn allocate(&mut self, n: usize) -> Result<NonNull<T>, AllocError> {
        let ptr = self.inner.allocate(n)?;
        if n > 0 {
            let addr = ptr.as_ptr() as usize;
            let mut log = self.log.borrow_mut();
            log.live.insert(addr, n);
            log.events.push(AllocEvent::Allocate { addr, n });
        }
        Ok(ptr)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, n: usize) -> Result<(), AllocError> {
        if n > 0 {
            let addr = ptr.as_ptr() as usize;
            let mut log = self.log.borrow_mut();
            let is_top = log.live.last().map(|(&top, _)| top) == Some(addr);
            if log.live.shift_remove(&addr).is_none() {
                return Err(AllocError::ForeignPointer);
            }
            if !is_top {
                log.out_of_order += 1;
            }
            log.events.push(AllocEvent::Deallocate { addr, n });
        }
        // SAFETY: forwarded caller contract; `ptr` came from `inner`.
        unsafe { self.inner.deallocate(ptr, n) }
    }

    fn rebind<U>(&self) -> RecordingAllocator<U> {
        RecordingAllocator {
            inner: HeapAllocator::new(),
            log: Rc::clone(&self.log),
        }
    }
}

/// Heap-backed [`ElementAllocator`] whose releases always fail.
///
/// The memory is still returned to the heap before the configured error
/// is reported, so tests using it do not leak.
pub struct RejectingAllocator<T> {
    inner: HeapAllocator<T>,
    error: AllocError,
}

impl<T> RejectingAllocator<T> {
    /// Create an allocator that answers every non-empty release with
    /// `error`.
    pub fn new(error: AllocError) -> Self {
        Self {
            inner: HeapAllocator::new(),
            error,
        }
    }
}

impl<T> ElementAllocator<T> for RejectingAllocator<T> {
    type Rebind<U> = RejectingAllocator<U>;

    fn allocate(&mut self, n: usize) -> Result<NonNull<T>, AllocError> {
        self.inner.allocate(n)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, n: usize) -> Result<(), AllocError> {
        // SAFETY: forwarded caller contract; `ptr` came from `inner`.
        unsafe { self.inner.deallocate(ptr, n)? };
        if n == 0 {
            return Ok(());
        }
        Err(self.error.clone())
    }

    fn rebind<U>(&self) -> RejectingAllocator<U> {
        RejectingAllocator::new(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_lifo_usage() {
        let mut alloc = RecordingAllocator::<u32>::new();
        let log = alloc.shared_log();
        let a = alloc.allocate(1).unwrap();
        let b = alloc.allocate(2).unwrap();
        unsafe {
            alloc.deallocate(b, 2).unwrap();
            alloc.deallocate(a, 1).unwrap();
        }
        let log = log.borrow();
        assert!(log.is_balanced());
        assert_eq!(log.out_of_order_releases(), 0);
        assert_eq!(log.allocations(), 2);
        assert_eq!(log.deallocations(), 2);
        assert_eq!(
            log.events()[1],
            AllocEvent::Allocate {
                addr: b.as_ptr() as usize,
                n: 2
            }
        );
    }

    #[test]
    fn counts_out_of_order_releases() {
        let mut alloc = RecordingAllocator::<u64>::new();
        let a = alloc.allocate(1).unwrap();
        let b = alloc.allocate(1).unwrap();
        unsafe {
            alloc.deallocate(a, 1).unwrap();
            alloc.deallocate(b, 1).unwrap();
        }
        assert_eq!(alloc.shared_log().borrow().out_of_order_releases(), 1);
    }

    #[test]
    fn rebind_shares_the_log() {
        let alloc = RecordingAllocator::<u8>::new();
        let mut rebound: RecordingAllocator<String> = alloc.rebind();
        let ptr = rebound.allocate(1).unwrap();
        assert_eq!(alloc.shared_log().borrow().live_count(), 1);
        unsafe { rebound.deallocate(ptr, 1).unwrap() };
        assert!(alloc.shared_log().borrow().is_balanced());
    }

    #[test]
    fn unknown_pointer_is_rejected() {
        let mut alloc = RecordingAllocator::<u64>::new();
        let mut other = HeapAllocator::<u64>::new();
        let foreign = other.allocate(1).unwrap();
        assert_eq!(
            unsafe { alloc.deallocate(foreign, 1) },
            Err(AllocError::ForeignPointer)
        );
        unsafe { other.deallocate(foreign, 1).unwrap() };
    }

    #[test]
    fn rejecting_allocator_frees_then_reports() {
        let alloc = RejectingAllocator::<u8>::new(AllocError::OverRelease {
            released: 1,
            in_use: 0,
        });
        let mut rebound: RejectingAllocator<u64> = alloc.rebind();
        let ptr = rebound.allocate(2).unwrap();
        assert_eq!(
            unsafe { rebound.deallocate(ptr, 2) },
            Err(AllocError::OverRelease {
                released: 1,
                in_use: 0
            })
        );
        let empty = rebound.allocate(0).unwrap();
        assert_eq!(unsafe { rebound.deallocate(empty, 0) }, Ok(()));
    }
}
