//! Low-level primitives for slot storage.
//!
//! Every trip to the global allocator in this crate goes through these two
//! functions. Zero-sized requests (zero elements, or zero-sized `T`) never
//! reach the global allocator and are represented by a dangling pointer.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::AllocError;

/// Layout of `count` contiguous `T` slots.
fn slots_layout<T>(count: usize) -> Result<Layout, AllocError> {
    Layout::array::<T>(count).map_err(|_| AllocError::LayoutOverflow { count })
}

/// Allocate uninitialised storage for `count` values of `T`.
pub(crate) fn alloc_slots<T>(count: usize) -> Result<NonNull<T>, AllocError> {
    let layout = slots_layout::<T>(count)?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }
    // SAFETY: `layout` has a non-zero size.
    let ptr = unsafe { alloc::alloc(layout) };
    NonNull::new(ptr.cast::<T>()).ok_or(AllocError::OutOfMemory {
        bytes: layout.size(),
    })
}

/// Release storage obtained from [`alloc_slots`].
///
/// # Safety
///
/// `ptr` must have been returned by `alloc_slots::<T>(count)` with the
/// same `count` and not released since.
pub(crate) unsafe fn free_slots<T>(ptr: NonNull<T>, count: usize) {
    // The layout was valid when the block was allocated.
    let Ok(layout) = slots_layout::<T>(count) else {
        return;
    };
    if layout.size() == 0 {
        return;
    }
    // SAFETY: caller guarantees `ptr` was allocated with this layout.
    unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_is_dangling() {
        let ptr = alloc_slots::<u64>(0).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        unsafe { free_slots(ptr, 0) };
    }

    #[test]
    fn zero_sized_type_is_dangling() {
        let ptr = alloc_slots::<()>(1024).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        unsafe { free_slots(ptr, 1024) };
    }

    #[test]
    fn allocation_is_aligned_and_writable() {
        let ptr = alloc_slots::<u64>(4).unwrap();
        assert_eq!(ptr.as_ptr() as usize % std::mem::align_of::<u64>(), 0);
        unsafe {
            for i in 0..4 {
                ptr.as_ptr().add(i).write(i as u64 * 10);
            }
            assert_eq!(*ptr.as_ptr().add(3), 30);
            free_slots(ptr, 4);
        }
    }

    #[test]
    fn overflowing_count_is_rejected() {
        assert_eq!(
            alloc_slots::<u64>(usize::MAX),
            Err(AllocError::LayoutOverflow { count: usize::MAX })
        );
    }
}
