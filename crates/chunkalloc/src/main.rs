//! `chunkalloc` binary: runs the container demo against stdout.
//!
//! The number of entries comes from `CHUNKALLOC_ENTRIES` (default
//! `CHUNK_SIZE`). Log output goes to stderr and is filtered by `RUST_LOG`.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chunkalloc::demo;
use chunkalloc::types::DemoConfig;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "demo failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = DemoConfig::from_env().context("invalid demo configuration")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    demo::run(&config, &mut out)
        .with_context(|| format!("demo with {} entries failed", config.entries))?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}
