//! Bounded-time page fetching for the Quickstart pipeline.
//!
//! A [`PageFetcher`] issues exactly one GET per call, with a total timeout and a
//! fixed `User-Agent`, and returns the full body plus a short display snippet.
//! There are no retries: a failed fetch is reported, never masked.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use quickstart_shared::{FetchConfig, QuickstartError, Result, ValidatedUrl};

pub use quickstart_shared::validate_url;

/// Number of characters kept in [`FetchResult::snippet`].
pub const SNIPPET_CHARS: usize = 500;

/// Default total timeout in seconds for a page fetch.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent string for fetch requests.
const DEFAULT_USER_AGENT: &str = "QuickstartUniverseMVP/0.1";

// ---------------------------------------------------------------------------
// FetchResult
// ---------------------------------------------------------------------------

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Full response body, decoded as text.
    pub body: String,
    /// The first [`SNIPPET_CHARS`] characters of `body`.
    pub snippet: String,
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
}

// ---------------------------------------------------------------------------
// Fetch options
// ---------------------------------------------------------------------------

/// Configuration for the page fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Total timeout for one request, in seconds.
    pub timeout_secs: u64,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&FetchConfig> for FetchOptions {
    fn from(config: &FetchConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
            user_agent: config.user_agent.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

/// HTTP page fetcher.
///
/// The inner client owns a connection pool and is safe to share between
/// concurrent pipeline runs.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher with the given options.
    pub fn new(opts: &FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(opts.user_agent.as_str())
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| QuickstartError::Unexpected(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch `url` with a single GET request.
    ///
    /// Non-2xx responses fail with [`QuickstartError::HttpStatus`], an exceeded
    /// time bound with [`QuickstartError::FetchTimeout`], and any other
    /// transport problem with [`QuickstartError::FetchTransport`].
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &ValidatedUrl) -> Result<FetchResult> {
        info!("fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "non-success status");
            return Err(QuickstartError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| classify(url, e))?;
        let snippet = snippet(&body);

        debug!(
            status = status.as_u16(),
            body_len = body.len(),
            %final_url,
            "page fetched"
        );

        Ok(FetchResult {
            body,
            snippet,
            status: status.as_u16(),
            final_url,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The first [`SNIPPET_CHARS`] characters of `body` (all of it if shorter).
pub fn snippet(body: &str) -> String {
    match body.char_indices().nth(SNIPPET_CHARS) {
        Some((end, _)) => body[..end].to_string(),
        None => body.to_string(),
    }
}

/// Map a transport error to the pipeline's error taxonomy.
fn classify(url: &ValidatedUrl, err: reqwest::Error) -> QuickstartError {
    if err.is_timeout() {
        return QuickstartError::FetchTimeout {
            url: url.to_string(),
        };
    }

    QuickstartError::FetchTransport {
        url: url.to_string(),
        cause: error_chain(&err),
    }
}

/// Render an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = inner.source();
    }
    out
}
