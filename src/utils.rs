//! Utility functions for log formatting and file system checks.
//!
//! - String truncation for log previews of large bodies
//! - Output directory validation before a long run starts

use crate::errors::ScrapeError;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) with
/// an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a scratch file so
/// a permissions problem surfaces before any page is fetched rather than when
/// the first region's file is written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), ScrapeError> {
    let output_dir_error = |source| ScrapeError::OutputDir {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(path).await.map_err(output_dir_error)?;
    let check_path = path.join("..__write_check__");
    stdfs::File::create(&check_path).map_err(output_dir_error)?;
    let _ = stdfs::remove_file(&check_path);
    info!("Output directory is writable");
    Ok(())
}
