//! The container demonstration run by the `chunkalloc` binary.
//!
//! Fills a heap-backed and a chunk-backed [`ArenaMap`] with
//! `(i, factorial(i))`, then a heap-backed and a chunk-backed [`ArenaList`]
//! with `i`, for `i` in `0..entries`. Only the chunk-backed containers are
//! printed. With more entries than [`CHUNK_SIZE`] the chunk-backed map runs
//! out of slots; past [`MAX_FACTORIAL_INPUT`] the factorial overflows first.
//!
//! [`CHUNK_SIZE`]: chunkalloc_core::CHUNK_SIZE
//! [`MAX_FACTORIAL_INPUT`]: chunkalloc_core::MAX_FACTORIAL_INPUT

use std::error::Error;
use std::fmt;
use std::io::{self, Write};

use chunkalloc_arena::{AllocError, ChunkAllocator, ElementAllocator};
use chunkalloc_collections::{ArenaList, ArenaMap};
use chunkalloc_core::{factorial, DemoConfig, OverflowError};

/// Map from key to factorial whose nodes live in a chunk arena.
pub type ChunkMap = ArenaMap<i32, i32, ChunkAllocator<(i32, i32)>>;

/// List of keys whose nodes live in a chunk arena.
pub type ChunkList = ArenaList<i32, ChunkAllocator<i32>>;

/// Failure of a demo run.
#[derive(Debug)]
pub enum DemoError {
    /// A container's allocator refused a node.
    Alloc(AllocError),
    /// A factorial did not fit in `i32`.
    Overflow(OverflowError),
    /// Writing the output failed.
    Io(io::Error),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc(_) => write!(f, "container allocation failed"),
            Self::Overflow(_) => write!(f, "entry value could not be computed"),
            Self::Io(_) => write!(f, "failed to write demo output"),
        }
    }
}

impl Error for DemoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            Self::Overflow(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<AllocError> for DemoError {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}

impl From<OverflowError> for DemoError {
    fn from(e: OverflowError) -> Self {
        Self::Overflow(e)
    }
}

impl From<io::Error> for DemoError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Keys `0..entries`. Factorial overflows long before `i32` runs out.
fn keys(entries: usize) -> impl Iterator<Item = i32> {
    (0..entries).map_while(|i| i32::try_from(i).ok())
}

/// Insert `(key, factorial(key))` for every key into `map`.
///
/// Stops at the first key whose factorial overflows or whose node cannot
/// be allocated.
pub fn fill_map<A>(map: &mut ArenaMap<i32, i32, A>, entries: usize) -> Result<(), DemoError>
where
    A: ElementAllocator<(i32, i32)>,
{
    for key in keys(entries) {
        let value = factorial(key)?;
        map.insert(key, value)?;
    }
    Ok(())
}

/// Append every key to `list`.
pub fn fill_list<A>(list: &mut ArenaList<i32, A>, entries: usize) -> Result<(), DemoError>
where
    A: ElementAllocator<i32>,
{
    for key in keys(entries) {
        list.add(key)?;
    }
    Ok(())
}

/// Run the demonstration, writing the chunk-backed containers to `out`.
///
/// The map is written one `"<key> <value>"` pair per line in ascending key
/// order, followed by the list on a single space-separated line. Nothing
/// is written if a container cannot be filled.
pub fn run<W: Write>(config: &DemoConfig, out: &mut W) -> Result<(), DemoError> {
    tracing::info!(entries = config.entries, "starting container demo");

    let mut heap_map: ArenaMap<i32, i32> = ArenaMap::new();
    fill_map(&mut heap_map, config.entries)?;
    let mut chunk_map = ChunkMap::new();
    fill_map(&mut chunk_map, config.entries)?;
    tracing::debug!(len = chunk_map.len(), "maps filled");

    let mut heap_list: ArenaList<i32> = ArenaList::new();
    fill_list(&mut heap_list, config.entries)?;
    let mut chunk_list = ChunkList::new();
    fill_list(&mut chunk_list, config.entries)?;
    tracing::debug!(len = chunk_list.len(), "lists filled");

    for (key, value) in &chunk_map {
        writeln!(out, "{key} {value}")?;
    }
    writeln!(out, "{chunk_list}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkalloc_core::CHUNK_SIZE;
    use chunkalloc_test_utils::RecordingAllocator;

    fn run_to_string(entries: usize) -> Result<String, DemoError> {
        let config = DemoConfig::new(entries).unwrap();
        let mut out = Vec::new();
        run(&config, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn default_run_prints_map_then_list() {
        let out = run_to_string(CHUNK_SIZE).unwrap();
        let expected = "\
0 1
1 1
2 2
3 6
4 24
5 120
6 720
7 5040
8 40320
9 362880
0 1 2 3 4 5 6 7 8 9
";
        assert_eq!(out, expected);
    }

    #[test]
    fn small_run() {
        assert_eq!(run_to_string(3).unwrap(), "0 1\n1 1\n2 2\n0 1 2\n");
    }

    #[test]
    fn more_entries_than_slots_fails_on_the_chunk_map() {
        let err = run_to_string(CHUNK_SIZE + 1).unwrap_err();
        assert!(matches!(
            err,
            DemoError::Alloc(AllocError::CapacityExceeded {
                requested: 1,
                remaining: 0
            })
        ));
        assert!(err.source().is_some());
    }

    #[test]
    fn overflow_is_reported_with_its_input() {
        let mut map: ArenaMap<i32, i32> = ArenaMap::new();
        let err = fill_map(&mut map, 14).unwrap_err();
        assert!(matches!(
            err,
            DemoError::Overflow(OverflowError::Factorial { input: 13 })
        ));
        assert_eq!(
            err.source().unwrap().to_string(),
            "integer overflow while calculating factorial of 13"
        );
        // Keys before the overflow were inserted.
        assert_eq!(map.len(), 13);
    }

    #[test]
    fn fill_releases_nodes_newest_first() {
        let alloc = RecordingAllocator::<(i32, i32)>::new();
        let log = alloc.shared_log();
        {
            let mut map = ArenaMap::with_allocator(alloc);
            fill_map(&mut map, 8).unwrap();
        }
        let log = log.borrow();
        assert!(log.is_balanced());
        assert_eq!(log.out_of_order_releases(), 0);
    }

    #[test]
    fn io_errors_are_surfaced() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = run(&DemoConfig::default(), &mut Broken).unwrap_err();
        assert!(matches!(err, DemoError::Io(_)));
        assert_eq!(err.to_string(), "failed to write demo output");
        assert_eq!(err.source().unwrap().to_string(), "closed");
    }
}
