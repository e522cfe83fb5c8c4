//! General-purpose allocator over the global heap.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::AllocError;
use crate::raw;
use crate::traits::ElementAllocator;

/// Stateless [`ElementAllocator`] that forwards to `std::alloc`.
///
/// The default allocator of every container in the workspace. Blocks may
/// be released in any order. Rebinding is free: all instances share the
/// global heap.
pub struct HeapAllocator<T> {
    _elem: PhantomData<fn() -> T>,
}

impl<T> HeapAllocator<T> {
    /// Create a heap allocator.
    pub const fn new() -> Self {
        Self {
            _elem: PhantomData,
        }
    }
}

impl<T> ElementAllocator<T> for HeapAllocator<T> {
    type Rebind<U> = HeapAllocator<U>;

    fn allocate(&mut self, n: usize) -> Result<NonNull<T>, AllocError> {
        let ptr = raw::alloc_slots::<T>(n)?;
        tracing::trace!(n, ?ptr, "heap allocate");
        Ok(ptr)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, n: usize) -> Result<(), AllocError> {
        tracing::trace!(n, ?ptr, "heap deallocate");
        // SAFETY: caller guarantees `ptr` came from `allocate(n)` here, and
        // `allocate` is a thin wrapper over `alloc_slots`.
        unsafe { raw::free_slots(ptr, n) };
        Ok(())
    }

    fn rebind<U>(&self) -> HeapAllocator<U> {
        HeapAllocator::new()
    }
}

impl<T> Default for HeapAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for HeapAllocator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HeapAllocator<T> {}

impl<T> fmt::Debug for HeapAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HeapAllocator")
    }
}
