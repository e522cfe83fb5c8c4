//! Chunkalloc: fixed-capacity stack arenas plugged into generic containers.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! chunkalloc sub-crates, plus the [`demo`] driven by the `chunkalloc` binary.
//!
//! # Quick start
//!
//! ```rust
//! use chunkalloc::prelude::*;
//!
//! // An ordered map whose nodes live in a ten-slot arena.
//! let mut map: ArenaMap<i32, i32, ChunkAllocator<(i32, i32)>> = ArenaMap::new();
//! for key in 0..CHUNK_SIZE as i32 {
//!     map.insert(key, factorial(key).unwrap()).unwrap();
//! }
//! assert_eq!(map.get(&5), Some(&120));
//! assert_eq!(map.allocator().state(), ArenaState::Full);
//!
//! // The arena does not grow.
//! assert!(matches!(
//!     map.insert(10, 0),
//!     Err(AllocError::CapacityExceeded { .. })
//! ));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `chunkalloc-arena` | Allocator trait, stack arena, adapters |
//! | [`types`] | `chunkalloc-core` | `CHUNK_SIZE`, demo config, factorial |
//! | [`collections`] | `chunkalloc-collections` | `ArenaMap`, `ArenaList` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocator contract and arena storage (`chunkalloc-arena`).
///
/// [`arena::ChunkAllocator`] is the container-facing adapter;
/// [`arena::ArenaStrategy`] is the bookkeeping underneath it.
pub use chunkalloc_arena as arena;

/// Constants, configuration, and arithmetic helpers (`chunkalloc-core`).
pub use chunkalloc_core as types;

/// Containers generic over [`arena::ElementAllocator`]
/// (`chunkalloc-collections`).
pub use chunkalloc_collections as collections;

pub mod demo;

/// Common imports for typical chunkalloc usage.
///
/// ```rust
/// use chunkalloc::prelude::*;
/// ```
pub mod prelude {
    // Allocators
    pub use chunkalloc_arena::{
        ArenaState, ArenaStrategy, ChunkAllocator, ElementAllocator, HeapAllocator,
    };

    // Containers
    pub use chunkalloc_collections::{ArenaList, ArenaMap};

    // Core
    pub use chunkalloc_core::{factorial, DemoConfig, CHUNK_SIZE};

    // Errors
    pub use chunkalloc_arena::AllocError;
    pub use chunkalloc_core::{ConfigError, OverflowError};
}
