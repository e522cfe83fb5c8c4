//! Error types for configuration and checked arithmetic.

use std::error::Error;
use std::fmt;

/// Arithmetic overflow detected before a result wrapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowError {
    /// The factorial of `input` does not fit in an `i32`.
    Factorial {
        /// The argument whose factorial overflowed.
        input: i32,
    },
}

impl fmt::Display for OverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factorial { input } => {
                write!(
                    f,
                    "integer overflow while calculating factorial of {input}"
                )
            }
        }
    }
}

impl Error for OverflowError {}

/// Errors from reading the demo's startup configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The entry count is not a non-negative integer.
    InvalidEntries {
        /// The raw value that failed to parse.
        value: String,
    },
    /// The entry count is zero, which leaves nothing to demonstrate.
    ZeroEntries,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEntries { value } => {
                write!(f, "invalid entry count '{value}': expected an unsigned integer")
            }
            Self::ZeroEntries => write!(f, "entry count must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
