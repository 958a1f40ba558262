//! Command-line interface definitions for the gas price scraper.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option has a default and can also be set through an environment
//! variable, so a bare `gas_price_scrape` scrapes all states into the current
//! directory.

use crate::models::Region;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the gas price scraper.
///
/// # Examples
///
/// ```sh
/// # All states, files in ./out, 1s between requests
/// gas_price_scrape --zip-table uszips.csv --output-dir ./out
///
/// # Just Delaware and Maryland, slower pacing
/// gas_price_scrape --states DE,MD --pause-ms 2500
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// CSV zip directory with `zip` and `state_id` columns
    #[arg(short, long, env = "GAS_ZIP_TABLE", default_value = "zips.csv")]
    pub zip_table: PathBuf,

    /// Directory receiving the `<STATE>_gas.csv` files
    #[arg(short, long, env = "GAS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Root URL of the listing site
    #[arg(long, env = "GAS_BASE_URL", default_value = "https://www.gasbuddy.com")]
    pub base_url: url::Url,

    /// Pause after each zip code, in milliseconds
    #[arg(long, env = "GAS_PAUSE_MS", default_value_t = 1000)]
    pub pause_ms: u64,

    /// File receiving warnings about skipped listings (truncated at start)
    #[arg(long, env = "GAS_LOG_FILE", default_value = "gas_scrape.log")]
    pub log_file: PathBuf,

    /// Comma-separated state codes to scrape instead of all of them
    #[arg(short, long, value_delimiter = ',')]
    pub states: Vec<Region>,
}

impl Cli {
    /// States to scrape, always in the fixed region order.
    pub fn regions(&self) -> Vec<Region> {
        Region::all()
            .filter(|r| self.states.is_empty() || self.states.contains(r))
            .collect()
    }
}
