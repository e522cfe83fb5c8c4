//! Arena capacity and demo configuration.

use crate::error::ConfigError;

/// Fixed element capacity of every chunk arena.
///
/// Also the default number of entries the demo inserts into each
/// container, so a default run fills the chunk-backed containers exactly.
pub const CHUNK_SIZE: usize = 10;

/// Startup configuration for the demonstration binary.
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoConfig {
    /// Number of `(i, i!)` entries inserted into each container.
    ///
    /// Default: [`CHUNK_SIZE`]. Values above `CHUNK_SIZE` exhaust the
    /// chunk arenas; values above 13 overflow the factorial.
    pub entries: usize,
}

impl DemoConfig {
    /// Environment variable holding the entry count override.
    pub const ENTRIES_VAR: &'static str = "CHUNKALLOC_ENTRIES";

    /// Create a config with an explicit entry count.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroEntries`] if `entries` is 0.
    pub fn new(entries: usize) -> Result<Self, ConfigError> {
        if entries == 0 {
            return Err(ConfigError::ZeroEntries);
        }
        Ok(Self { entries })
    }

    /// Read the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    ///
    /// Missing keys fall back to defaults. Surrounding whitespace in
    /// values is ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(Self::ENTRIES_VAR) {
            None => Ok(Self::default()),
            Some(raw) => {
                let entries = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidEntries { value: raw.clone() })?;
                Self::new(entries)
            }
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            entries: CHUNK_SIZE,
        }
    }
}
