//! Containers that take their storage from a pluggable allocator.
//!
//! Both containers are generic over
//! [`ElementAllocator`](chunkalloc_arena::ElementAllocator) for their
//! element type and rebind it to their internal node type, the way an
//! ordered container turns an allocator for its entries into one for its
//! tree nodes.
//!
//! - [`ArenaMap`]: ordered map (unbalanced binary search tree)
//! - [`ArenaList`]: singly-linked list with tail insertion
//!
//! Nodes are always released newest first, so both containers run on a
//! stack allocator such as [`ChunkAllocator`](chunkalloc_arena::ChunkAllocator).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod list;
pub mod map;

pub use list::{ArenaList, ListNode};
pub use map::{ArenaMap, MapNode};
