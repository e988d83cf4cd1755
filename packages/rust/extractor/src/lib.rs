//! Content extraction: identify a runnable tool described on a web page.
//!
//! The pipeline only depends on the [`ContentExtractor`] trait. This crate
//! ships two implementations:
//! - [`GeminiExtractor`]: asks a Gemini model for the tool name, a
//!   `docker run` command, and a Compose snippet. Without an API key it
//!   degrades to mock mode.
//! - [`MockExtractor`]: offline, recognizes nothing, and says so explicitly.

mod gemini;
mod mock;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use quickstart_shared::{
    ExtractedContent, ExtractorConfig, QuickstartError, Result, ValidatedUrl, resolve_api_key,
};

pub use gemini::{GeminiExtractor, GeminiOptions};
pub use mock::{MOCK_SOURCE, MockExtractor};

/// A backend able to turn page content into an [`ExtractedContent`].
///
/// Implementations may perform network I/O or long-running inference. Any
/// failure is reported as [`QuickstartError::Extraction`].
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Extract tool information from the page `html` fetched from `url`.
    async fn extract(&self, html: &str, url: &ValidatedUrl) -> Result<ExtractedContent>;

    /// Human-readable backend name, used in step traces.
    fn name(&self) -> &str;
}

/// Build the extractor selected by `config.provider`.
pub fn build_extractor(config: &ExtractorConfig) -> Result<Arc<dyn ContentExtractor>> {
    match config.provider.as_str() {
        "mock" => {
            info!("using mock extractor");
            Ok(Arc::new(MockExtractor::new()))
        }
        "gemini" => {
            let api_key = resolve_api_key(config);
            let opts = GeminiOptions::from_config(config, api_key);
            Ok(Arc::new(GeminiExtractor::new(opts)?))
        }
        other => Err(QuickstartError::config(format!(
            "unknown extractor provider '{other}': expected 'gemini' or 'mock'"
        ))),
    }
}
