//! CSV output, one file per region.
//!
//! Files are named `<REGION>_gas.csv` and replaced on every run. Rows keep
//! the order they were scraped in; a station without a complete price report
//! has empty `price`, `last_update_time` and `updated_by` cells.

use crate::errors::ScrapeError;
use crate::models::{Region, RegionResults, StationRecord};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Column names, in output order.
pub const HEADER: [&str; 9] = [
    "id_value",
    "name",
    "address",
    "city_state",
    "state",
    "zip_code",
    "price",
    "last_update_time",
    "updated_by",
];

/// Output file path for a region.
pub fn region_path(output_dir: &Path, region: Region) -> PathBuf {
    output_dir.join(format!("{}_gas.csv", region.code()))
}

/// Serialize rows to CSV bytes, header first, `\n` line endings.
pub fn render(records: &[StationRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(HEADER)?;
    for record in records {
        wtr.write_record([
            record.identifier.as_str(),
            record.name.as_str(),
            record.street_address.as_str(),
            record.city_state.as_str(),
            record.region.code(),
            record.zip_code.as_str(),
            record.price().unwrap_or_default(),
            record.last_update_time().unwrap_or_default(),
            record.updated_by().unwrap_or_default(),
        ])?;
    }

    wtr.into_inner().map_err(|e| e.into_error().into())
}

/// Write a region's rows to `<output_dir>/<REGION>_gas.csv`, replacing any previous file.
///
/// # Returns
///
/// The path that was written.
#[instrument(level = "info", skip_all, fields(region = %results.region, rows = results.records.len()))]
pub async fn write_region(output_dir: &Path, results: &RegionResults) -> Result<PathBuf, ScrapeError> {
    let region = results.region;
    let bytes = render(&results.records)
        .map_err(|source| ScrapeError::Serialize { region, source })?;
    let path = region_path(output_dir, region);

    fs::write(&path, bytes)
        .await
        .map_err(|source| ScrapeError::Write {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "Wrote region CSV");

    Ok(path)
}
