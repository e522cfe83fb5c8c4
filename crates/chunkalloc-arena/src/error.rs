//! Allocator error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during allocator operations.
///
/// Allocators never recover from these themselves; they are returned to
/// the immediate caller (normally a container), which fails its own
/// operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The arena has fewer free slots than the request needs.
    CapacityExceeded {
        /// Number of element slots requested.
        requested: usize,
        /// Number of element slots still free.
        remaining: usize,
    },
    /// A release would return more slots than are currently handed out.
    OverRelease {
        /// Number of element slots being released.
        released: usize,
        /// Number of element slots currently in use.
        in_use: usize,
    },
    /// A block was released while a more recently allocated block is
    /// still live. The arena only reclaims the top of its stack.
    OutOfOrderRelease {
        /// Slot offset of the block being released.
        offset: usize,
        /// Slot offset the top-of-stack block starts at.
        expected: usize,
    },
    /// The pointer does not point at a slot boundary inside this arena.
    ForeignPointer,
    /// `count` elements do not fit in the address space.
    LayoutOverflow {
        /// Number of elements requested.
        count: usize,
    },
    /// The global allocator refused the request.
    OutOfMemory {
        /// Size of the refused request in bytes.
        bytes: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} slots, {remaining} remaining"
                )
            }
            Self::OverRelease { released, in_use } => {
                write!(
                    f,
                    "released {released} slots but only {in_use} are in use"
                )
            }
            Self::OutOfOrderRelease { offset, expected } => {
                write!(
                    f,
                    "out-of-order release: block at slot {offset}, top of stack at slot {expected}"
                )
            }
            Self::ForeignPointer => write!(f, "pointer does not belong to this arena"),
            Self::LayoutOverflow { count } => {
                write!(f, "layout overflow allocating {count} elements")
            }
            Self::OutOfMemory { bytes } => {
                write!(f, "global allocator failed to provide {bytes} bytes")
            }
        }
    }
}

impl Error for AllocError {}

impl AllocError {
    /// Whether the error reports a broken stack (LIFO) usage contract
    /// rather than a lack of memory.
    pub fn is_discipline_violation(&self) -> bool {
        matches!(
            self,
            Self::OverRelease { .. } | Self::OutOfOrderRelease { .. } | Self::ForeignPointer
        )
    }
}
