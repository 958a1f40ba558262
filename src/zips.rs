//! Zip code lookup by state.
//!
//! [`ZipResolver`] is the seam the driver depends on. [`ZipTable`] is the
//! shipped implementation: a zip directory CSV loaded once at startup, such
//! as the freely available US zip code databases that carry a `zip` and a
//! `state_id` column.

use crate::errors::ZipError;
use crate::models::{Region, ZipCode};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Trait for resolving the zip codes that belong to a region.
pub trait ZipResolver {
    /// Zip codes for `region`, in the order they should be scraped.
    ///
    /// An empty list is a valid answer and produces an empty output file.
    async fn zip_codes(&self, region: Region) -> Result<Vec<ZipCode>, ZipError>;
}

#[derive(Debug, Deserialize)]
struct ZipRow {
    #[serde(alias = "zipcode")]
    zip: String,
    #[serde(alias = "state")]
    state_id: String,
}

/// In-memory zip directory, zips sorted ascending per region.
#[derive(Debug, Default)]
pub struct ZipTable {
    by_region: HashMap<Region, Vec<ZipCode>>,
}

impl ZipTable {
    /// Load a zip directory from a CSV file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ZipError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ZipError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(bytes.as_slice())?;
        info!(
            regions = table.by_region.len(),
            zips = table.by_region.values().map(Vec::len).sum::<usize>(),
            "Loaded zip directory"
        );
        Ok(table)
    }

    /// Parse a zip directory from any CSV source with a header row.
    ///
    /// Rows with an empty zip, or for codes outside the fixed region list
    /// (e.g. `PR`, `GU`), are ignored. Numeric zips shorter than five digits
    /// are zero-padded.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, ZipError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut sets: HashMap<Region, BTreeSet<ZipCode>> = HashMap::new();
        let mut ignored = 0usize;

        for row in rdr.deserialize::<ZipRow>() {
            let row = row?;
            let zip = row.zip.trim();
            let region = match Region::from_code(&row.state_id) {
                Some(region) if !zip.is_empty() => region,
                _ => {
                    ignored += 1;
                    continue;
                }
            };
            sets.entry(region)
                .or_default()
                .insert(ZipCode::new(pad_zip(zip)));
        }

        if ignored > 0 {
            debug!(ignored, "Skipped zip rows without a zip or outside the region list");
        }

        let by_region = sets
            .into_iter()
            .map(|(region, zips)| (region, zips.into_iter().collect()))
            .collect();
        Ok(Self { by_region })
    }
}

impl ZipResolver for ZipTable {
    async fn zip_codes(&self, region: Region) -> Result<Vec<ZipCode>, ZipError> {
        Ok(self.by_region.get(&region).cloned().unwrap_or_default())
    }
}

fn pad_zip(zip: &str) -> String {
    if !zip.is_empty() && zip.len() < 5 && zip.bytes().all(|b| b.is_ascii_digit()) {
        format!("{zip:0>5}")
    } else {
        zip.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTORY: &str = "\
zip,lat,lng,city,state_id,state_name
19904,39.16,-75.55,Dover,DE,Delaware
19901,39.16,-75.51,Dover,DE,Delaware
1001,42.06,-72.62,Agawam,MA,Massachusetts
00601,18.18,-66.75,Adjuntas,PR,Puerto Rico
19901,39.16,-75.51,Dover,DE,Delaware
";

    fn region(code: &str) -> Region {
        Region::from_code(code).unwrap()
    }

    #[tokio::test]
    async fn test_zips_sorted_and_deduplicated() {
        let table = ZipTable::from_reader(DIRECTORY.as_bytes()).unwrap();
        let zips = table.zip_codes(region("DE")).await.unwrap();
        assert_eq!(zips, vec![ZipCode::new("19901"), ZipCode::new("19904")]);
    }

    #[tokio::test]
    async fn test_short_numeric_zip_is_padded() {
        let table = ZipTable::from_reader(DIRECTORY.as_bytes()).unwrap();
        let zips = table.zip_codes(region("MA")).await.unwrap();
        assert_eq!(zips, vec![ZipCode::new("01001")]);
    }

    #[tokio::test]
    async fn test_region_without_zips_is_empty() {
        let table = ZipTable::from_reader(DIRECTORY.as_bytes()).unwrap();
        assert!(table.zip_codes(region("WY")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_alias_headers_accepted() {
        let csv = "zipcode,state\n82001,wy\n";
        let table = ZipTable::from_reader(csv.as_bytes()).unwrap();
        let zips = table.zip_codes(region("WY")).await.unwrap();
        assert_eq!(zips, vec![ZipCode::new("82001")]);
    }

    #[tokio::test]
    async fn test_rows_without_zip_are_ignored() {
        let csv = "zip,state_id\n,DE\n  ,DE\n19720,DE\n";
        let table = ZipTable::from_reader(csv.as_bytes()).unwrap();
        let zips = table.zip_codes(region("DE")).await.unwrap();
        assert_eq!(zips, vec![ZipCode::new("19720")]);
    }

    #[test]
    fn test_missing_columns_is_an_error() {
        let csv = "postal,province\n19901,DE\n";
        assert!(matches!(
            ZipTable::from_reader(csv.as_bytes()),
            Err(ZipError::Csv(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ZipTable::load("/nonexistent/zips.csv").await.unwrap_err();
        assert!(matches!(err, ZipError::Read { .. }));
    }
}
