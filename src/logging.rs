//! Tracing setup.
//!
//! Two layers share one registry:
//! - console: `RUST_LOG` filter (default `info`), RFC 3339 UTC timestamps
//! - log file: `WARN` and above, plain text, truncated on every run

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self as tfmt, time::UtcTime};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once, before anything logs.
pub fn init(log_file: &Path) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tfmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(filter);

    let file = File::create(log_file)?;
    let warnings = tfmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(console)
        .with(warnings)
        .init();
    Ok(())
}
