//! Site scrapers that turn fetched result pages into station rows.
//!
//! A scraper module owns everything specific to one listing site:
//!
//! - the search URL for a zip code
//! - the class-based selectors that locate station listings
//! - the per-listing extraction rules
//!
//! Scrapers never perform I/O. They receive markup that was already fetched
//! and return rows plus the listings they had to skip, so the caller decides
//! how failures are reported.
//!
//! # Supported Sources
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | GasBuddy | [`gasbuddy`] | Zip code search results, regular fuel only |

pub mod gasbuddy;
