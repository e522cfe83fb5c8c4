//! The allocator capability set containers are written against.

use std::ptr::{self, NonNull};

use crate::error::AllocError;

/// A pluggable allocator for elements of type `T`.
///
/// Containers hold an implementor by value and call it for every node
/// they store. Insertion pairs [`allocate`](Self::allocate) with
/// [`construct`](Self::construct); removal pairs
/// [`destroy`](Self::destroy) with [`deallocate`](Self::deallocate).
/// Containers that need storage for an internal node type rather than
/// `T` itself obtain a matching allocator through [`rebind`](Self::rebind).
///
/// Implementors may require releases in reverse allocation order (see
/// [`ChunkAllocator`](crate::ChunkAllocator)); containers intended to
/// work with every implementor release their nodes newest first.
pub trait ElementAllocator<T> {
    /// The same allocator family parameterised for `U`.
    type Rebind<U>: ElementAllocator<U>;

    /// Reserve uninitialised storage for `n` contiguous elements.
    ///
    /// The returned memory is never initialised. For `n == 0` the pointer
    /// is dangling but well aligned.
    fn allocate(&mut self, n: usize) -> Result<NonNull<T>, AllocError>;

    /// Return storage previously obtained from [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate(n)` on this allocator with the same
    /// `n`, and must not have been released already. Any value constructed
    /// there must already have been destroyed or moved out.
    unsafe fn deallocate(&mut self, ptr: NonNull<T>, n: usize) -> Result<(), AllocError>;

    /// Initialise the slot at `ptr` with `value`. Does not allocate.
    ///
    /// # Safety
    ///
    /// `ptr` must point to allocated, currently uninitialised storage from
    /// this allocator. Any previous value there is overwritten without
    /// being dropped.
    unsafe fn construct(&mut self, ptr: NonNull<T>, value: T) {
        // SAFETY: caller guarantees `ptr` is valid for writes and aligned.
        unsafe { ptr.as_ptr().write(value) }
    }

    /// Run `T`'s destructor in place. Does not deallocate.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a value previously initialised with
    /// [`construct`](Self::construct) and not yet destroyed.
    unsafe fn destroy(&mut self, ptr: NonNull<T>) {
        // SAFETY: caller guarantees `ptr` holds a live, initialised `T`.
        unsafe { ptr::drop_in_place(ptr.as_ptr()) }
    }

    /// Produce an allocator for `U` from the same family.
    ///
    /// Whether the result shares storage with `self` is up to the
    /// implementor.
    fn rebind<U>(&self) -> Self::Rebind<U>;
}
