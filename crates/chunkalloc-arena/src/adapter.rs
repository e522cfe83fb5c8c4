//! Allocator adapter that plugs an [`ArenaStrategy`] into containers.
//!
//! [`ChunkAllocator`] implements [`ElementAllocator`] on top of one
//! exclusively owned arena. Every typed view gets its own arena: a
//! [`rebind`](ElementAllocator::rebind) or a [`Clone`] starts from a fresh,
//! empty pool and never aliases the source.

use std::fmt;
use std::mem;
use std::ptr::NonNull;

use chunkalloc_core::CHUNK_SIZE;

use crate::error::AllocError;
use crate::strategy::{ArenaState, ArenaStrategy};
use crate::traits::ElementAllocator;

/// A container allocator backed by a private `N`-slot stack arena.
///
/// Allocation is delegated unchanged to the arena. Deallocation checks
/// the stack contract before the arena's counter is touched: the released
/// block must be the most recently allocated live block. Anything else is
/// rejected with [`AllocError::OutOfOrderRelease`] (or
/// [`AllocError::ForeignPointer`] for pointers outside the arena), so a
/// misbehaving container fails loudly instead of aliasing live slots.
///
/// Zero-sized element types have no addressable slots; for them only the
/// slot count is checked.
pub struct ChunkAllocator<T, const N: usize = CHUNK_SIZE> {
    strategy: ArenaStrategy<T, N>,
}

impl<T, const N: usize> ChunkAllocator<T, N> {
    /// Create an adapter with a fresh arena.
    ///
    /// # Panics
    ///
    /// Panics if the arena storage cannot be allocated; see
    /// [`ArenaStrategy::new`].
    pub fn new() -> Self {
        Self {
            strategy: ArenaStrategy::new(),
        }
    }

    /// Create an adapter, reporting storage failure as an error.
    pub fn try_new() -> Result<Self, AllocError> {
        Ok(Self {
            strategy: ArenaStrategy::try_new()?,
        })
    }

    /// The owned arena.
    pub fn strategy(&self) -> &ArenaStrategy<T, N> {
        &self.strategy
    }

    /// Free slots left in the arena.
    pub fn remaining(&self) -> usize {
        self.strategy.remaining()
    }

    /// Slots currently handed out.
    pub fn in_use(&self) -> usize {
        self.strategy.in_use()
    }

    /// Total slots in the arena.
    pub fn capacity(&self) -> usize {
        N
    }

    /// Fill level of the arena.
    pub fn state(&self) -> ArenaState {
        self.strategy.state()
    }

    /// Check that `ptr`/`n` names the top block of the arena's stack.
    fn check_top_of_stack(&self, ptr: NonNull<T>, n: usize) -> Result<(), AllocError> {
        let in_use = self.strategy.in_use();
        let Some(expected) = in_use.checked_sub(n) else {
            tracing::warn!(released = n, in_use, "chunk allocator over-release");
            return Err(AllocError::OverRelease {
                released: n,
                in_use,
            });
        };
        if mem::size_of::<T>() == 0 {
            return Ok(());
        }

        let Some(offset) = self.strategy.offset_of(ptr) else {
            tracing::warn!(?ptr, "release of a pointer outside the arena");
            return Err(AllocError::ForeignPointer);
        };
        if offset != expected {
            tracing::warn!(offset, expected, "out-of-order release rejected");
            return Err(AllocError::OutOfOrderRelease { offset, expected });
        }
        Ok(())
    }
}

impl<T, const N: usize> ElementAllocator<T> for ChunkAllocator<T, N> {
    type Rebind<U> = ChunkAllocator<U, N>;

    fn allocate(&mut self, n: usize) -> Result<NonNull<T>, AllocError> {
        self.strategy.allocate(n)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, n: usize) -> Result<(), AllocError> {
        if n == 0 {
            return Ok(());
        }
        self.check_top_of_stack(ptr, n)?;
        self.strategy.deallocate(n)
    }

    fn rebind<U>(&self) -> ChunkAllocator<U, N> {
        tracing::debug!(
            from = std::any::type_name::<T>(),
            to = std::any::type_name::<U>(),
            "rebinding chunk allocator to a fresh arena"
        );
        ChunkAllocator::new()
    }
}

impl<T, const N: usize> Default for ChunkAllocator<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Converting copy from an adapter for another element type. Like
/// [`rebind`](ElementAllocator::rebind), the result owns a fresh arena.
impl<T, U, const N: usize> From<&ChunkAllocator<U, N>> for ChunkAllocator<T, N> {
    fn from(other: &ChunkAllocator<U, N>) -> Self {
        other.rebind::<T>()
    }
}

/// Clones start with an empty arena of their own.
impl<T, const N: usize> Clone for ChunkAllocator<T, N> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for ChunkAllocator<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkAllocator")
            .field("strategy", &self.strategy)
            .finish()
    }
}
