//! Core types for the chunkalloc workspace.
//!
//! This is the leaf crate with zero internal dependencies. It holds the
//! pieces every other crate agrees on: the arena capacity constant, the
//! demo's startup configuration, the overflow-checked math helpers used
//! to populate containers, and the error types those helpers return.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod math;

pub use config::{DemoConfig, CHUNK_SIZE};
pub use error::{ConfigError, OverflowError};
pub use math::{factorial, MAX_FACTORIAL_INPUT};
