//! Error types for each stage of a scrape run.
//!
//! Only [`ScrapeError`] ends a run. [`ExtractError`] is confined to the
//! fragment that produced it, and [`FetchError`] to the zip code whose page
//! could not be fetched.

use crate::models::Region;
use std::path::PathBuf;
use thiserror::Error;

/// Why a station listing could not be turned into a row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("address block not found")]
    AddressMissing,

    #[error("address block has {0} children, expected 3")]
    AddressShape(usize),

    #[error("station name header not found")]
    NameHeaderMissing,

    #[error("station name header has no link")]
    NameLinkMissing,

    #[error("station link has no href")]
    IdentifierMissing,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid search url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ZipError {
    #[error("failed to read zip directory {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed zip directory: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("zip lookup failed for {region}: {source}")]
    Zips {
        region: Region,
        #[source]
        source: ZipError,
    },

    #[error("failed to serialize rows for {region}: {source}")]
    Serialize {
        region: Region,
        #[source]
        source: csv::Error,
    },

    #[error("output directory {path} is not writable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
