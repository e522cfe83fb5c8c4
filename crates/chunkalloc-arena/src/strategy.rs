//! The fixed-capacity arena behind [`ChunkAllocator`](crate::ChunkAllocator).
//!
//! [`ArenaStrategy`] owns one contiguous block of `N` element slots and a
//! single counter of free slots. Allocation bumps upward from slot 0;
//! deallocation only restores the counter. It has no record of which
//! block is returned, which makes it a stack allocator: the only safe
//! release is the most recently allocated block.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use chunkalloc_core::CHUNK_SIZE;

use crate::error::AllocError;
use crate::raw;

/// Fill level of an [`ArenaStrategy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaState {
    /// No slots handed out (`remaining == N`).
    Fresh,
    /// Some, but not all, slots handed out.
    PartiallyFilled,
    /// Every slot handed out (`remaining == 0`).
    Full,
}

/// A pool of `N` uninitialised `T` slots with bump allocation.
///
/// The storage is acquired in [`new`](Self::new) and released on drop.
/// Values constructed in the slots are never dropped by the arena; the
/// caller destroys them before releasing the slots.
///
/// # Usage contract
///
/// Slot offsets are derived from the live counter, so releasing anything
/// other than the most recent block (or releasing while a newer block is
/// live) makes the next `allocate` hand out slots that are still in use.
/// [`deallocate`](Self::deallocate) cannot detect this. Callers that need
/// the check go through [`ChunkAllocator`](crate::ChunkAllocator).
pub struct ArenaStrategy<T, const N: usize = CHUNK_SIZE> {
    /// Start of the `N`-slot block.
    storage: NonNull<T>,
    /// Free slots. Invariant: `remaining <= N`.
    remaining: usize,
    _slots: PhantomData<T>,
}

impl<T, const N: usize> ArenaStrategy<T, N> {
    /// Number of element slots in every arena of this type.
    pub const CAPACITY: usize = N;

    /// Create a fresh arena with all `N` slots free.
    ///
    /// # Panics
    ///
    /// Panics if `N` slots of `T` overflow the address space or the
    /// global allocator cannot provide them. Use
    /// [`try_new`](Self::try_new) to handle that as an error.
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(arena) => arena,
            Err(err) => panic!("cannot create arena of {N} slots: {err}"),
        }
    }

    /// Create a fresh arena, reporting storage failure as an error.
    pub fn try_new() -> Result<Self, AllocError> {
        let storage = raw::alloc_slots::<T>(N)?;
        tracing::debug!(
            capacity = N,
            slot_bytes = mem::size_of::<T>(),
            "arena created"
        );
        Ok(Self {
            storage,
            remaining: N,
            _slots: PhantomData,
        })
    }

    /// Reserve `n` contiguous slots.
    ///
    /// Decrements the free counter by `n` and returns slot
    /// `N - remaining - n` (computed after the decrement), so sequential
    /// calls fill the arena upward from slot 0. The memory is not
    /// initialised. `n == 0` returns a dangling pointer and changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::CapacityExceeded`] if `n` exceeds the free
    /// slots. The arena is left unchanged.
    pub fn allocate(&mut self, n: usize) -> Result<NonNull<T>, AllocError> {
        if n == 0 {
            return Ok(NonNull::dangling());
        }
        if n > self.remaining {
            tracing::warn!(
                requested = n,
                remaining = self.remaining,
                capacity = N,
                "arena capacity exceeded"
            );
            return Err(AllocError::CapacityExceeded {
                requested: n,
                remaining: self.remaining,
            });
        }

        self.remaining -= n;
        let offset = N - self.remaining - n;
        tracing::trace!(offset, n, remaining = self.remaining, "arena allocate");

        // SAFETY: `offset + n == N - remaining <= N`, so the result stays
        // inside the block.
        Ok(unsafe { self.storage.add(offset) })
    }

    /// Return `n` slots to the arena.
    ///
    /// Only the counter changes. The arena does not know which block is
    /// being returned; see the type-level usage contract.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::OverRelease`] if more slots are released than
    /// are in use. The counter is left unchanged.
    pub fn deallocate(&mut self, n: usize) -> Result<(), AllocError> {
        let in_use = self.in_use();
        if n > in_use {
            tracing::warn!(released = n, in_use, "arena over-release");
            return Err(AllocError::OverRelease {
                released: n,
                in_use,
            });
        }
        self.remaining += n;
        tracing::trace!(n, remaining = self.remaining, "arena deallocate");
        Ok(())
    }

    /// Number of free slots.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Number of slots handed out.
    pub fn in_use(&self) -> usize {
        N - self.remaining
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        N
    }

    /// Current fill level. A zero-capacity arena is always `Full`.
    pub fn state(&self) -> ArenaState {
        if self.remaining == 0 {
            ArenaState::Full
        } else if self.remaining == N {
            ArenaState::Fresh
        } else {
            ArenaState::PartiallyFilled
        }
    }

    /// Slot index of `ptr` within this arena.
    ///
    /// Returns `None` if `ptr` lies outside the block or not on a slot
    /// boundary. Zero-sized `T` has no distinguishable slots and always
    /// yields `None`.
    pub fn offset_of(&self, ptr: NonNull<T>) -> Option<usize> {
        let size = mem::size_of::<T>();
        if size == 0 {
            return None;
        }
        let base = self.storage.as_ptr() as usize;
        let delta = (ptr.as_ptr() as usize).checked_sub(base)?;
        if delta % size != 0 {
            return None;
        }
        let index = delta / size;
        (index < N).then_some(index)
    }

    /// Whether `ptr` addresses a slot of this arena.
    pub fn contains(&self, ptr: NonNull<T>) -> bool {
        self.offset_of(ptr).is_some()
    }
}

impl<T, const N: usize> Default for ArenaStrategy<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for ArenaStrategy<T, N> {
    fn drop(&mut self) {
        if self.remaining != N {
            tracing::debug!(in_use = self.in_use(), "arena dropped with slots in use");
        }
        // SAFETY: `storage` came from `alloc_slots::<T>(N)` in `try_new`.
        unsafe { raw::free_slots(self.storage, N) }
    }
}

impl<T, const N: usize> fmt::Debug for ArenaStrategy<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaStrategy")
            .field("capacity", &N)
            .field("remaining", &self.remaining)
            .field("state", &self.state())
            .finish()
    }
}
