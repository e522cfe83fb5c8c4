//! Benchmark workloads for the chunkalloc allocators.
//!
//! Each workload is generic over [`ElementAllocator`] so the same code
//! measures the chunk arena and the global heap side by side:
//!
//! - [`stack_churn`]: allocate a block, release it, repeat
//! - [`map_of_factorials`]: fill an [`ArenaMap`] with `(i, i!)`
//! - [`list_of_keys`]: fill an [`ArenaList`] with `0..entries`

#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use chunkalloc::demo::{self, DemoError};
use chunkalloc::prelude::*;

/// Allocate and immediately release `block` slots, `rounds` times.
///
/// Returns the number of successful round trips.
pub fn stack_churn<A: ElementAllocator<u64>>(alloc: &mut A, block: usize, rounds: usize) -> usize {
    let mut done = 0;
    for _ in 0..rounds {
        let Ok(ptr) = alloc.allocate(block) else {
            break;
        };
        // The block is released right after it is taken, so it is always
        // the top of the stack.
        if release_block(alloc, ptr, block).is_err() {
            break;
        }
        done += 1;
    }
    done
}

#[allow(unsafe_code)]
fn release_block<A: ElementAllocator<u64>>(
    alloc: &mut A,
    ptr: std::ptr::NonNull<u64>,
    block: usize,
) -> Result<(), AllocError> {
    // SAFETY: `ptr` was returned by `alloc.allocate(block)` and holds no
    // initialised values.
    unsafe { alloc.deallocate(ptr, block) }
}

/// Map of `(i, i!)` for `i` in `0..entries` over allocator `A`.
pub fn map_of_factorials<A>(entries: usize) -> Result<ArenaMap<i32, i32, A>, DemoError>
where
    A: ElementAllocator<(i32, i32)> + Default,
{
    let mut map = ArenaMap::new();
    demo::fill_map(&mut map, entries)?;
    Ok(map)
}

/// List of `0..entries` over allocator `A`.
pub fn list_of_keys<A>(entries: usize) -> Result<ArenaList<i32, A>, DemoError>
where
    A: ElementAllocator<i32> + Default,
{
    let mut list = ArenaList::new();
    demo::fill_list(&mut list, entries)?;
    Ok(list)
}
