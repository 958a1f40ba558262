//! # Gas Price Scrape
//!
//! Scrapes per-station gas prices from GasBuddy's zip code search, state by
//! state, and writes one CSV file per state.
//!
//! ## Usage
//!
//! ```sh
//! gas_price_scrape --zip-table uszips.csv --output-dir ./out
//! ```
//!
//! ## Architecture
//!
//! The application is a single sequential loop:
//! 1. **Zip lookup**: Resolve each state's zip codes from the zip directory
//! 2. **Fetching**: Request the search page for every zip code, one at a time
//! 3. **Extraction**: Turn each station listing into a row, skipping broken ones
//! 4. **Output**: Write `<STATE>_gas.csv` once the state's last zip is done

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

mod cli;
mod driver;
mod errors;
mod fetch;
mod logging;
mod models;
mod outputs;
mod scrapers;
mod utils;
mod zips;

use cli::Cli;
use driver::{ScrapeConfig, Scraper, TokioPacer};
use fetch::{random_user_agent, HttpFetcher};
use utils::ensure_writable_dir;
use zips::ZipTable;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    logging::init(&args.log_file)?;

    let start_time = Instant::now();
    let regions = args.regions();
    info!(
        states = %regions.iter().join(","),
        zip_table = %args.zip_table.display(),
        output_dir = %args.output_dir.display(),
        "gas_price_scrape starting up"
    );

    // Early check: a bad output dir should fail before hours of fetching
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let zips = ZipTable::load(&args.zip_table).await?;
    let fetcher = HttpFetcher::new(random_user_agent())?;
    info!(user_agent = fetcher.user_agent(), "Selected user agent");

    let scraper = Scraper::new(
        zips,
        fetcher,
        TokioPacer,
        ScrapeConfig {
            base_url: args.base_url.clone(),
            output_dir: args.output_dir.clone(),
            pause: Duration::from_millis(args.pause_ms),
        },
    );

    let summary = match scraper.run(&regions).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Scrape aborted");
            return Err(e.into());
        }
    };

    for state in &summary.regions {
        debug!(
            state = %state.region,
            zips = state.zips,
            pages_fetched = state.pages_fetched,
            records = state.records,
            path = %state.path.display(),
            "State summary"
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        states = summary.regions.len(),
        records = summary.total_records(),
        skipped = summary.total_skipped(),
        failed_pages = summary.total_failed_pages(),
        "Execution complete"
    );

    Ok(())
}
