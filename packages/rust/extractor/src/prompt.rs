//! Prompt construction and model-answer parsing.
//!
//! Page HTML is reduced to Markdown with `htmd` before it is sent to a model,
//! then clipped to a character budget. Model answers are expected to be a
//! single JSON object, optionally wrapped in a fenced code block.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

use quickstart_shared::{QuickstartError, Result, ValidatedUrl};

/// Tags dropped during HTML → Markdown conversion.
const SKIP_TAGS: [&str; 8] = [
    "script", "style", "nav", "iframe", "noscript", "svg", "header", "footer",
];

/// Matches a fenced code block, capturing its body.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("fence regex")
});

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector"));

/// Fields a model is asked to return.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolAnswer {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub docker_run_command: Option<String>,
    #[serde(default)]
    pub docker_compose_snippet: Option<String>,
}

/// Convert page HTML into Markdown suitable for a prompt.
///
/// Falls back to the visible text of `<body>` if conversion fails.
pub fn page_to_markdown(html: &str) -> String {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIP_TAGS.to_vec())
        .build();

    match converter.convert(html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            debug!(error = %e, "htmd conversion failed, using body text");
            body_text(html)
        }
    }
}

/// Whitespace-normalized text content of `<body>`.
fn body_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    doc.select(&BODY_SELECTOR)
        .next()
        .map(|body| body.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clip `content` to at most `max_chars` characters.
///
/// Returns the clipped text and whether anything was removed.
pub fn truncate_chars(content: &str, max_chars: usize) -> (String, bool) {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => (
            format!("{}\n\n[... content truncated ...]", &content[..end]),
            true,
        ),
        None => (content.to_string(), false),
    }
}

/// Build the extraction prompt for a page.
pub fn build_prompt(url: &ValidatedUrl, page_markdown: &str) -> String {
    format!(
        "You are analysing a web page to help a developer run the software it describes.\n\
         Identify the primary tool or service documented on the page and how to start it with Docker.\n\
         \n\
         Respond with a single JSON object and nothing else, using exactly these keys:\n\
         - \"tool_name\": the tool's name, or null if the page does not describe a runnable tool\n\
         - \"docker_run_command\": one complete `docker run` command line, or null\n\
         - \"docker_compose_snippet\": a docker-compose YAML block for the tool, or null\n\
         \n\
         Only use commands and images that the page supports; do not invent image names.\n\
         \n\
         Page URL: {url}\n\
         \n\
         Page content:\n\
         {page_markdown}\n"
    )
}

/// Parse a model answer into a [`ToolAnswer`].
///
/// Accepts bare JSON, JSON inside a fenced block, or JSON surrounded by prose.
pub fn parse_answer(text: &str) -> Result<ToolAnswer> {
    let candidate = FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim();

    if let Ok(answer) = serde_json::from_str::<ToolAnswer>(candidate) {
        return Ok(answer);
    }

    // Last resort: the outermost `{ ... }` span.
    let object = match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if start < end => &candidate[start..=end],
        _ => {
            return Err(QuickstartError::extraction(format!(
                "model answer is not JSON: {}",
                preview(text)
            )));
        }
    };

    serde_json::from_str(object).map_err(|e| {
        QuickstartError::extraction(format!("malformed model answer ({e}): {}", preview(text)))
    })
}

/// First 200 characters of `text`, for error messages.
fn preview(text: &str) -> String {
    truncate_chars(text.trim(), 200).0
}
