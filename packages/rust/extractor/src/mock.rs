//! Offline extractor used when no model backend is available.

use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

use quickstart_shared::{ExtractedContent, NO_TOOL_FOUND_KEY, Result, ValidatedUrl};

use crate::ContentExtractor;

/// `source` metadata value reported by [`MockExtractor`].
pub const MOCK_SOURCE: &str = "MockExtractor - No specific tool recognized";

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector"));

/// Extractor that never recognizes a tool and flags that explicitly.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor;

impl MockExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentExtractor for MockExtractor {
    async fn extract(&self, html: &str, url: &ValidatedUrl) -> Result<ExtractedContent> {
        let mut metadata = Map::new();
        metadata.insert("source".into(), Value::from(MOCK_SOURCE));
        metadata.insert(NO_TOOL_FOUND_KEY.into(), Value::Bool(true));
        metadata.insert("url".into(), Value::from(url.as_str()));
        if let Some(title) = page_title(html) {
            metadata.insert("page_title".into(), Value::from(title));
        }

        debug!(%url, "mock extraction");

        Ok(ExtractedContent {
            extraction_metadata: metadata,
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "MockExtractor"
    }
}

/// Trimmed `<title>` text, if any.
fn page_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}
