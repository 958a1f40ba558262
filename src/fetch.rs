//! HTTP page fetching for search result pages.
//!
//! # Architecture
//!
//! - [`PageFetcher`]: Core trait, one GET per call, returns the raw body
//! - [`HttpFetcher`]: `reqwest` implementation with a browser user agent
//!
//! Requests are not retried. A failed fetch goes back to the caller, which
//! skips that zip code.
//!
//! # User Agent
//!
//! One entry of [`USER_AGENTS`] is picked at random when the fetcher is built
//! and sent with every request of the run.

use crate::errors::FetchError;
use crate::utils::truncate_for_log;
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// Desktop browser user agents (Chrome, then Internet Explorer/Edge).
pub static USER_AGENTS: [&str; 23] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.113 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.90 Safari/537.36",
    "Mozilla/5.0 (Windows NT 5.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.90 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.2; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.90 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/44.0.2403.157 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.3; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.113 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/57.0.2987.133 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/57.0.2987.133 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/55.0.2883.87 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/55.0.2883.87 Safari/537.36",
    "Mozilla/4.0 (compatible; MSIE 9.0; Windows NT 6.1)",
    "Mozilla/5.0 (Windows NT 6.1; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; WOW64; Trident/5.0)",
    "Mozilla/5.0 (Windows NT 6.1; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (Windows NT 6.2; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.0; Trident/5.0)",
    "Mozilla/5.0 (Windows NT 6.3; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (compatible; MSIE 10.0; Windows NT 6.1; WOW64; Trident/6.0)",
    "Mozilla/5.0 (compatible; MSIE 10.0; Windows NT 6.1; Trident/6.0)",
    "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 5.1; Trident/4.0; .NET CLR 2.0.50727; .NET CLR 3.0.4506.2152; .NET CLR 3.5.30729)",
];

/// Pick one user agent from [`USER_AGENTS`] at random.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Trait for fetching a page body.
///
/// Implementors return whatever body the server sent. Status codes are not
/// treated as errors, since the listing parser copes with pages that carry no
/// listings.
pub trait PageFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// [`PageFetcher`] backed by a `reqwest` client.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    user_agent: &'static str,
}

impl HttpFetcher {
    /// Build a client that sends `user_agent` with every request.
    pub fn new(user_agent: &'static str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, user_agent })
    }

    pub fn user_agent(&self) -> &'static str {
        self.user_agent
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "Request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(
                %status,
                body_preview = %truncate_for_log(&body, 300),
                "Non-success status; parsing body anyway"
            );
        }
        debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}
