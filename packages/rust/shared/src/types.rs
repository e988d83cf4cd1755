//! Core domain types for a Quickstart pipeline run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ErrorKind;

/// Metadata key an extractor sets to `true` when it explicitly recognized no tool.
pub const NO_TOOL_FOUND_KEY: &str = "no_tool_found";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ExtractedContent
// ---------------------------------------------------------------------------

/// Structured result returned by a content extractor.
///
/// Every field is optional: an absent `tool_name` means no tool was recognized,
/// and downstream code must not assume any field is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Name of the identified tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// A single runnable `docker run` command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_run_command: Option<String>,
    /// A multi-line Docker Compose block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_compose_snippet: Option<String>,
    /// Free-form provenance (backend, model, source path...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extraction_metadata: Map<String, Value>,
}

impl ExtractedContent {
    /// Turn empty or whitespace-only string fields into `None`.
    pub fn normalized(mut self) -> Self {
        fn clean(field: &mut Option<String>) {
            if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *field = None;
            }
        }
        clean(&mut self.tool_name);
        clean(&mut self.docker_run_command);
        clean(&mut self.docker_compose_snippet);
        self
    }

    /// Whether the extractor explicitly signalled that it recognized no tool.
    pub fn no_tool_found(&self) -> bool {
        self.extraction_metadata
            .get(NO_TOOL_FOUND_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// The extracted-data summary embedded in a [`PipelineResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    #[serde(flatten)]
    pub content: ExtractedContent,
    /// Informational note, e.g. when no tool was recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ExtractedContent> for ExtractedInfo {
    fn from(content: ExtractedContent) -> Self {
        Self {
            content,
            message: None,
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratedArtifacts
// ---------------------------------------------------------------------------

/// Bootstrap artifacts derived from an [`ExtractedContent`].
///
/// Both fields are always populated, either with a real script/snippet or
/// with a placeholder comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifacts {
    pub bash_script: String,
    pub compose_script: String,
}

// ---------------------------------------------------------------------------
// PipelineResult
// ---------------------------------------------------------------------------

/// Output of one pipeline run.
///
/// Everything except `steps` is optional; a failed run still carries whatever
/// partial data was gathered before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Identifier of the run that produced this result.
    pub run_id: RunId,
    /// The URL exactly as submitted.
    pub submitted_url: String,
    /// First 500 characters of the fetched page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<ExtractedInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<GeneratedArtifacts>,
    /// User-facing description of the failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Ordered, human-readable step trace.
    pub steps: Vec<String>,
}

impl PipelineResult {
    /// An empty result for a run that is about to start.
    pub fn new(run_id: RunId, submitted_url: impl Into<String>) -> Self {
        Self {
            run_id,
            submitted_url: submitted_url.into(),
            snippet: None,
            extracted: None,
            artifacts: None,
            error: None,
            error_kind: None,
            steps: Vec::new(),
        }
    }

    /// Whether the run failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracted_content_from_partial_json() {
        let parsed: ExtractedContent =
            serde_json::from_value(json!({ "tool_name": "Redis" })).expect("deserialize");
        assert_eq!(parsed.tool_name.as_deref(), Some("Redis"));
        assert!(parsed.docker_run_command.is_none());
        assert!(parsed.extraction_metadata.is_empty());
    }

    #[test]
    fn normalized_drops_blank_fields() {
        let content = ExtractedContent {
            tool_name: Some("  ".into()),
            docker_run_command: Some(String::new()),
            docker_compose_snippet: Some("services: {}".into()),
            extraction_metadata: Map::new(),
        }
        .normalized();
        assert!(content.tool_name.is_none());
        assert!(content.docker_run_command.is_none());
        assert_eq!(content.docker_compose_snippet.as_deref(), Some("services: {}"));
    }

    #[test]
    fn no_tool_found_requires_boolean_flag() {
        let mut content = ExtractedContent::default();
        assert!(!content.no_tool_found());

        content
            .extraction_metadata
            .insert(NO_TOOL_FOUND_KEY.into(), json!("yes"));
        assert!(!content.no_tool_found());

        content
            .extraction_metadata
            .insert(NO_TOOL_FOUND_KEY.into(), json!(true));
        assert!(content.no_tool_found());
    }

    #[test]
    fn extracted_info_flattens_content() {
        let info = ExtractedInfo {
            content: ExtractedContent {
                tool_name: None,
                extraction_metadata: Map::from_iter([("source".to_string(), json!("mock"))]),
                ..Default::default()
            },
            message: Some("No specific tool recognized by content extractor.".into()),
        };
        let value = serde_json::to_value(&info).expect("serialize");
        assert_eq!(value["extraction_metadata"]["source"], "mock");
        assert_eq!(
            value["message"],
            "No specific tool recognized by content extractor."
        );
        assert!(value.get("tool_name").is_none());
    }

    #[test]
    fn pipeline_result_roundtrip() {
        let mut result = PipelineResult::new(RunId::new(), "not a url");
        result.error = Some("Invalid URL format: not a url.".into());
        result.error_kind = Some(ErrorKind::InvalidUrlFormat);
        result.steps.push("Attempting to fetch content from: not a url".into());

        let json = serde_json::to_string(&result).expect("serialize");
        let parsed: PipelineResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, result);
        assert!(parsed.is_error());
        assert!(parsed.artifacts.is_none());
    }
}
