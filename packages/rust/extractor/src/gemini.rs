//! Gemini-backed content extractor.
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`).
//! When constructed without an API key it runs in mock mode and delegates to
//! [`MockExtractor`]; the pipeline cannot tell the difference.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use quickstart_shared::{
    ExtractedContent, ExtractorConfig, NO_TOOL_FOUND_KEY, QuickstartError, Result, ValidatedUrl,
};

use crate::mock::MockExtractor;
use crate::prompt;
use crate::ContentExtractor;

/// Public Generative Language API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// `source` metadata value reported for model-backed extractions.
const SOURCE: &str = "GeminiExtractor";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Construction options for [`GeminiExtractor`].
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    /// API key; `None` selects mock mode.
    pub api_key: Option<String>,
    /// Model id, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// API base URL (overridable for tests).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Page content budget, in characters.
    pub max_content_chars: usize,
}

impl GeminiOptions {
    /// Derive options from the `[extractor]` config section and a resolved key.
    pub fn from_config(config: &ExtractorConfig, api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs: config.timeout_secs,
            max_content_chars: config.max_content_chars,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

// ---------------------------------------------------------------------------
// GeminiExtractor
// ---------------------------------------------------------------------------

/// Extractor backed by a Gemini model, with an offline fallback.
pub struct GeminiExtractor {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    max_content_chars: usize,
    fallback: MockExtractor,
}

impl GeminiExtractor {
    /// Build the extractor. Logs whether it will use the API or mock mode.
    pub fn new(opts: GeminiOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| {
                QuickstartError::extraction(format!("failed to build HTTP client: {e}"))
            })?;

        if opts.api_key.is_some() {
            info!(model = %opts.model, "Gemini API key found, extractor will call the API");
        } else {
            warn!("no Gemini API key configured, extractor will run in mock mode");
        }

        Ok(Self {
            client,
            api_key: opts.api_key,
            model: opts.model,
            base_url: opts.base_url.trim_end_matches('/').to_string(),
            max_content_chars: opts.max_content_chars,
            fallback: MockExtractor::new(),
        })
    }

    /// Whether requests are served by the offline fallback.
    pub fn is_mock_mode(&self) -> bool {
        self.api_key.is_none()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one prompt and return the model's text answer.
    async fn generate(&self, api_key: &str, prompt_text: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt_text }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| QuickstartError::extraction(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(QuickstartError::extraction(format!(
                "Gemini API returned HTTP {status}: {}",
                prompt::truncate_chars(detail.trim(), 200).0
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            QuickstartError::extraction(format!("malformed Gemini response: {e}"))
        })?;

        parsed
            .first_text()
            .ok_or_else(|| QuickstartError::extraction("Gemini returned no candidate text"))
    }
}

#[async_trait]
impl ContentExtractor for GeminiExtractor {
    #[instrument(skip_all, fields(url = %url, model = %self.model))]
    async fn extract(&self, html: &str, url: &ValidatedUrl) -> Result<ExtractedContent> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("mock mode, delegating to fallback extractor");
            return self.fallback.extract(html, url).await;
        };

        let markdown = prompt::page_to_markdown(html);
        let (content, truncated) = prompt::truncate_chars(&markdown, self.max_content_chars);
        let prompt_text = prompt::build_prompt(url, &content);

        debug!(
            content_chars = markdown.chars().count(),
            truncated, "sending extraction prompt"
        );

        let answer_text = self.generate(api_key, &prompt_text).await?;
        let answer = prompt::parse_answer(&answer_text)?;

        let mut metadata = Map::new();
        metadata.insert("source".into(), Value::from(SOURCE));
        metadata.insert("model".into(), Value::from(self.model.as_str()));
        metadata.insert(
            "content_chars".into(),
            Value::from(markdown.chars().count()),
        );
        metadata.insert("truncated".into(), Value::Bool(truncated));

        let mut extracted = ExtractedContent {
            tool_name: answer.tool_name,
            docker_run_command: answer.docker_run_command,
            docker_compose_snippet: answer.docker_compose_snippet,
            extraction_metadata: metadata,
        }
        .normalized();

        if extracted.tool_name.is_none() {
            extracted
                .extraction_metadata
                .insert(NO_TOOL_FOUND_KEY.into(), Value::Bool(true));
        }

        info!(
            tool = extracted.tool_name.as_deref().unwrap_or("none"),
            has_run_command = extracted.docker_run_command.is_some(),
            has_compose = extracted.docker_compose_snippet.is_some(),
            "extraction complete"
        );

        Ok(extracted)
    }

    fn name(&self) -> &str {
        "GeminiExtractor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickstart_shared::{ErrorKind, validate_url};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-test";

    fn options(server: &MockServer, api_key: Option<&str>) -> GeminiOptions {
        GeminiOptions {
            api_key: api_key.map(String::from),
            model: MODEL.into(),
            base_url: server.uri(),
            timeout_secs: 5,
            max_content_chars: 1_000,
        }
    }

    fn answer_body(text: &str) -> Value {
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": text } ] } }
            ]
        })
    }

    fn page_url() -> ValidatedUrl {
        validate_url("https://hub.docker.com/_/redis").unwrap()
    }

    async fn mount_answer(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn options_from_config_uses_default_base_url() {
        let opts = GeminiOptions::from_config(&ExtractorConfig::default(), None);
        assert_eq!(opts.base_url, DEFAULT_BASE_URL);
        assert_eq!(opts.model, "gemini-1.5-flash");
        assert!(opts.api_key.is_none());
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn extracts_tool_from_model_answer() {
        let server = MockServer::start().await;
        let answer = r#"{"tool_name": "Redis", "docker_run_command": "docker run -d -p 6379:6379 redis", "docker_compose_snippet": "services:\n  redis:\n    image: redis"}"#;
        mount_answer(
            &server,
            ResponseTemplate::new(200).set_body_json(answer_body(answer)),
        )
        .await;

        let extractor = GeminiExtractor::new(options(&server, Some("test-key"))).unwrap();
        assert!(!extractor.is_mock_mode());

        let html = "<html><body><h1>Redis</h1><pre>docker run redis</pre></body></html>";
        let content = extractor.extract(html, &page_url()).await.unwrap();

        assert_eq!(content.tool_name.as_deref(), Some("Redis"));
        assert_eq!(
            content.docker_run_command.as_deref(),
            Some("docker run -d -p 6379:6379 redis")
        );
        assert!(content.docker_compose_snippet.is_some());
        assert_eq!(content.extraction_metadata["source"], SOURCE);
        assert_eq!(content.extraction_metadata["model"], MODEL);
        assert!(!content.no_tool_found());
    }

    #[tokio::test]
    async fn null_tool_sets_no_tool_flag() {
        let server = MockServer::start().await;
        let answer = "```json\n{\"tool_name\": null, \"docker_run_command\": \"\"}\n```";
        mount_answer(
            &server,
            ResponseTemplate::new(200).set_body_json(answer_body(answer)),
        )
        .await;

        let extractor = GeminiExtractor::new(options(&server, Some("test-key"))).unwrap();
        let content = extractor
            .extract("<p>A blog post</p>", &page_url())
            .await
            .unwrap();

        assert!(content.tool_name.is_none());
        assert!(content.docker_run_command.is_none());
        assert!(content.no_tool_found());
    }

    #[tokio::test]
    async fn api_error_is_extraction_error() {
        let server = MockServer::start().await;
        mount_answer(
            &server,
            ResponseTemplate::new(429).set_body_string("quota exceeded"),
        )
        .await;

        let extractor = GeminiExtractor::new(options(&server, Some("test-key"))).unwrap();
        let err = extractor
            .extract("<p>page</p>", &page_url())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn empty_candidates_is_extraction_error() {
        let server = MockServer::start().await;
        mount_answer(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
        )
        .await;

        let extractor = GeminiExtractor::new(options(&server, Some("test-key"))).unwrap();
        let err = extractor
            .extract("<p>page</p>", &page_url())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no candidate text"));
    }

    #[tokio::test]
    async fn malformed_answer_is_extraction_error() {
        let server = MockServer::start().await;
        mount_answer(
            &server,
            ResponseTemplate::new(200).set_body_json(answer_body("no idea, sorry")),
        )
        .await;

        let extractor = GeminiExtractor::new(options(&server, Some("test-key"))).unwrap();
        let err = extractor
            .extract("<p>page</p>", &page_url())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Extraction);
    }

    #[tokio::test]
    async fn missing_key_delegates_to_mock() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let extractor = GeminiExtractor::new(options(&server, None)).unwrap();
        assert!(extractor.is_mock_mode());

        let content = extractor
            .extract("<title>Docs</title>", &page_url())
            .await
            .unwrap();

        assert!(content.no_tool_found());
        assert_eq!(content.extraction_metadata["source"], crate::MOCK_SOURCE);
    }
}
