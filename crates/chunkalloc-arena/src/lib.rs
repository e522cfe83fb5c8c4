//! Fixed-capacity arena allocation for generic containers.
//!
//! Provides a chunk arena that hands out element slots from a single
//! pre-sized block, and an allocator adapter that lets any container
//! written against [`ElementAllocator`] store its nodes there instead of
//! on the global heap. This is the only crate in the workspace that
//! contains `unsafe` code.
//!
//! # Architecture
//!
//! ```text
//! ChunkAllocator<T, N> (adapter, implements ElementAllocator<T>)
//! └── ArenaStrategy<T, N> (exclusively owned)
//!     ├── storage: N uninitialised slots of T (raw.rs)
//!     └── remaining: free-slot counter
//!
//! HeapAllocator<T> (implements ElementAllocator<T> over std::alloc)
//! ```
//!
//! # Usage contract
//!
//! The arena is a stack allocator. Blocks must be released in reverse
//! order of allocation. [`ChunkAllocator`] checks this in
//! [`ElementAllocator::deallocate`] and returns
//! [`AllocError::OutOfOrderRelease`] instead of corrupting the counter. The raw [`ArenaStrategy`] does not check: releasing out of
//! order there makes later allocations alias live slots.
//!
//! Neither type is `Send` or `Sync`. One arena belongs to one thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod adapter;
pub mod error;
pub mod heap;
mod raw;
pub mod strategy;
pub mod traits;

// Public re-exports for the primary API surface.
pub use adapter::ChunkAllocator;
pub use chunkalloc_core::CHUNK_SIZE;
pub use error::AllocError;
pub use heap::HeapAllocator;
pub use strategy::{ArenaState, ArenaStrategy};
pub use traits::ElementAllocator;
