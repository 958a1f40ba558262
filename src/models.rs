//! Data models for regions, zip codes and scraped station rows.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Region`]: One of the fixed two-letter state/territory codes
//! - [`ZipCode`]: A postal code resolved for a region
//! - [`StationRecord`]: One output row, built from a single station listing
//! - [`PriceReport`]: The price, report time and reporter, kept together
//! - [`RegionResults`]: The rows accumulated for a single region

use std::fmt;

/// Every region scraped by a full run, in the order they are processed.
pub static REGION_CODES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

/// A US state or territory, identified by its two-letter code.
///
/// Only codes from [`REGION_CODES`] can be constructed, so a `Region` is
/// always one the scraper knows how to iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region(&'static str);

impl Region {
    /// All regions in processing order.
    pub fn all() -> impl Iterator<Item = Region> {
        REGION_CODES.iter().map(|code| Region(*code))
    }

    /// Look up a region by code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Region> {
        let code = code.trim();
        REGION_CODES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(code))
            .map(|known| Region(*known))
    }

    pub fn code(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::from_code(s).ok_or_else(|| format!("unknown state code: {s:?}"))
    }
}

/// A postal code. Stored as text so leading zeros (e.g. `"01001"`) survive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZipCode(String);

impl ZipCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price data reported for a station.
///
/// The three values are only ever recorded together: a listing missing any
/// one of them yields no `PriceReport` at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceReport {
    /// Displayed price text, e.g. `"$3.19"`.
    pub price: String,
    /// Relative time of the last report, e.g. `"2 Hours Ago"`.
    pub last_update_time: String,
    /// Display name of the user who reported the price.
    pub updated_by: String,
}

/// A single station row as written to the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRecord {
    /// The station link target, e.g. `"/station/12345"`.
    pub identifier: String,
    pub name: String,
    pub street_address: String,
    pub city_state: String,
    pub region: Region,
    /// The zip code whose search page listed this station.
    pub zip_code: ZipCode,
    /// `None` when the listing carried no complete price report.
    pub report: Option<PriceReport>,
}

impl StationRecord {
    pub fn price(&self) -> Option<&str> {
        self.report.as_ref().map(|r| r.price.as_str())
    }

    pub fn last_update_time(&self) -> Option<&str> {
        self.report.as_ref().map(|r| r.last_update_time.as_str())
    }

    pub fn updated_by(&self) -> Option<&str> {
        self.report.as_ref().map(|r| r.updated_by.as_str())
    }
}

/// Rows accumulated for one region across all of its zip codes.
#[derive(Debug)]
pub struct RegionResults {
    pub region: Region,
    pub records: Vec<StationRecord>,
}

impl RegionResults {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            records: Vec::new(),
        }
    }
}
