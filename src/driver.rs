//! The scrape loop: regions, then zip codes, then station listings.
//!
//! For each region the driver resolves its zip codes, fetches and extracts
//! every search page in turn, pauses between requests, and writes the
//! region's CSV once its last zip code is done. Everything runs in sequence;
//! no two requests are ever in flight together.
//!
//! # Failure Handling
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Malformed station listing | Warning logged, listing skipped |
//! | Missing price/time/reporter | Row kept without price data |
//! | Page fetch failed | Error logged, zip code skipped, pause still applied |
//! | Zip lookup or file write failed | Run aborted |

use crate::errors::{FetchError, ScrapeError};
use crate::fetch::PageFetcher;
use crate::models::{Region, RegionResults, ZipCode};
use crate::outputs::tabular;
use crate::scrapers::gasbuddy::{self, PageExtraction};
use crate::zips::ZipResolver;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Waits out the interval between two page requests.
pub trait Pacer {
    async fn pause(&self, interval: Duration);
}

/// [`Pacer`] that sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    async fn pause(&self, interval: Duration) {
        if !interval.is_zero() {
            sleep(interval).await;
        }
    }
}

/// Settings for a scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Site root the search URL is built from.
    pub base_url: Url,
    /// Directory receiving the `<REGION>_gas.csv` files.
    pub output_dir: PathBuf,
    /// Pause after every zip code, whatever the outcome of its request.
    pub pause: Duration,
}

/// Counters for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSummary {
    pub region: Region,
    pub zips: usize,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub records: usize,
    /// Station listings dropped for broken structure (one warning each).
    pub skipped: usize,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub regions: Vec<RegionSummary>,
}

impl RunSummary {
    pub fn total_records(&self) -> usize {
        self.regions.iter().map(|r| r.records).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.regions.iter().map(|r| r.skipped).sum()
    }

    pub fn total_failed_pages(&self) -> usize {
        self.regions.iter().map(|r| r.pages_failed).sum()
    }
}

/// Runs the scrape loop over injected collaborators.
#[derive(Debug)]
pub struct Scraper<Z, F, P> {
    zips: Z,
    fetcher: F,
    pacer: P,
    config: ScrapeConfig,
}

impl<Z, F, P> Scraper<Z, F, P>
where
    Z: ZipResolver,
    F: PageFetcher,
    P: Pacer,
{
    pub fn new(zips: Z, fetcher: F, pacer: P, config: ScrapeConfig) -> Self {
        Self {
            zips,
            fetcher,
            pacer,
            config,
        }
    }

    /// Scrape each region in order, writing one file per region.
    pub async fn run(&self, regions: &[Region]) -> Result<RunSummary, ScrapeError> {
        let mut summary = RunSummary::default();
        for &region in regions {
            summary.regions.push(self.scrape_region(region).await?);
        }
        Ok(summary)
    }

    /// Scrape every zip code of `region` and write its file.
    #[instrument(level = "info", skip_all, fields(%region))]
    pub async fn scrape_region(&self, region: Region) -> Result<RegionSummary, ScrapeError> {
        let zips = self
            .zips
            .zip_codes(region)
            .await
            .map_err(|source| ScrapeError::Zips { region, source })?;
        info!(zips = zips.len(), "Resolved zip codes");

        let mut results = RegionResults::new(region);
        let mut pages_fetched = 0;
        let mut pages_failed = 0;
        let mut skipped = 0;

        for (i, zip) in zips.iter().enumerate() {
            info!(%zip, index = i + 1, total = zips.len(), "Processing zip code");

            match self.scrape_zip(region, zip).await {
                Ok(page) => {
                    pages_fetched += 1;
                    for fragment in &page.skipped {
                        warn!(
                            %region,
                            %zip,
                            error = %fragment.error,
                            fragment = %fragment.html,
                            "Skipping malformed station listing"
                        );
                    }
                    skipped += page.skipped.len();
                    debug!(%zip, rows = page.records.len(), "Extracted page");
                    results.records.extend(page.records);
                }
                Err(e) => {
                    pages_failed += 1;
                    error!(%zip, error = %e, "Failed to fetch search page; skipping zip code");
                }
            }

            self.pacer.pause(self.config.pause).await;
        }

        let path = tabular::write_region(&self.config.output_dir, &results).await?;

        let summary = RegionSummary {
            region,
            zips: zips.len(),
            pages_fetched,
            pages_failed,
            records: results.records.len(),
            skipped,
            path,
        };
        info!(
            records = summary.records,
            skipped = summary.skipped,
            pages_failed = summary.pages_failed,
            "Finished region"
        );
        Ok(summary)
    }

    async fn scrape_zip(&self, region: Region, zip: &ZipCode) -> Result<PageExtraction, FetchError> {
        let url = gasbuddy::search_url(&self.config.base_url, zip)?;
        let body = self.fetcher.fetch(&url).await?;
        Ok(gasbuddy::extract_page(&body, region, zip))
    }
}
