//! Bootstrap artifact generation.
//!
//! Turns an [`ExtractedContent`] into a Bash script and a Docker Compose
//! snippet. Generation is a pure function of its input and never fails: when a
//! field is missing, the artifact is a placeholder comment saying so.

use tracing::debug;

use quickstart_shared::{ExtractedContent, GeneratedArtifacts};

/// Bash script used when the extractor suggested no `docker run` command.
pub const NO_RUN_COMMAND_PLACEHOLDER: &str = "# No Docker run command suggested by extractor.";

/// Compose script used when the extractor suggested no Compose snippet.
pub const NO_COMPOSE_PLACEHOLDER: &str = "# No Docker Compose snippet suggested by extractor.";

/// Generate both artifacts.
pub fn generate(extracted: &ExtractedContent) -> GeneratedArtifacts {
    let artifacts = GeneratedArtifacts {
        bash_script: bash_script(extracted),
        compose_script: compose_script(extracted),
    };

    debug!(
        bash_len = artifacts.bash_script.len(),
        compose_len = artifacts.compose_script.len(),
        "artifacts generated"
    );

    artifacts
}

/// Bash bootstrap script wrapping the suggested `docker run` command.
pub fn bash_script(extracted: &ExtractedContent) -> String {
    let Some(command) = present(&extracted.docker_run_command) else {
        return NO_RUN_COMMAND_PLACEHOLDER.to_string();
    };

    let tool = present(&extracted.tool_name);
    let opening = tool.unwrap_or("tool");
    let closing = tool.unwrap_or("Tool");

    format!(
        "#!/bin/bash\n\
         echo \"Attempting to run {opening} Docker container (from Extractor)...\"\n\
         {command}\n\
         echo \"{closing} container should be running. Check with 'docker ps'.\""
    )
}

/// The suggested Compose snippet, verbatim.
pub fn compose_script(extracted: &ExtractedContent) -> String {
    present(&extracted.docker_compose_snippet)
        .unwrap_or(NO_COMPOSE_PLACEHOLDER)
        .to_string()
}

/// A field's value, treating the empty string as absent.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    fn redis() -> ExtractedContent {
        ExtractedContent {
            tool_name: Some("Redis".into()),
            docker_run_command: Some("docker run redis".into()),
            docker_compose_snippet: Some("services:\n  redis:\n    image: redis\n".into()),
            extraction_metadata: Map::from_iter([(
                "source".to_string(),
                Value::from("test"),
            )]),
        }
    }

    #[test]
    fn bash_script_wraps_run_command() {
        let script = bash_script(&redis());
        assert_eq!(
            script,
            "#!/bin/bash\n\
             echo \"Attempting to run Redis Docker container (from Extractor)...\"\n\
             docker run redis\n\
             echo \"Redis container should be running. Check with 'docker ps'.\""
        );
        assert!(script.contains("Redis Docker container"));
    }

    #[test]
    fn bash_script_without_tool_name_uses_fallbacks() {
        let extracted = ExtractedContent {
            docker_run_command: Some("docker run -d nginx".into()),
            ..Default::default()
        };
        let script = bash_script(&extracted);
        assert!(script.contains("Attempting to run tool Docker container"));
        assert!(script.contains("echo \"Tool container should be running."));
        assert!(script.contains("\ndocker run -d nginx\n"));
    }

    #[test]
    fn compose_snippet_is_verbatim() {
        let extracted = redis();
        assert_eq!(
            compose_script(&extracted),
            "services:\n  redis:\n    image: redis\n"
        );
    }

    #[test]
    fn missing_fields_yield_placeholders() {
        let artifacts = generate(&ExtractedContent::default());
        assert_eq!(
            artifacts.bash_script,
            "# No Docker run command suggested by extractor."
        );
        assert_eq!(
            artifacts.compose_script,
            "# No Docker Compose snippet suggested by extractor."
        );
    }

    #[test]
    fn tool_name_alone_still_yields_placeholders() {
        let extracted = ExtractedContent {
            tool_name: Some("Kafka".into()),
            ..Default::default()
        };
        let artifacts = generate(&extracted);
        assert_eq!(artifacts.bash_script, NO_RUN_COMMAND_PLACEHOLDER);
        assert_eq!(artifacts.compose_script, NO_COMPOSE_PLACEHOLDER);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let extracted = ExtractedContent {
            tool_name: Some(String::new()),
            docker_run_command: Some("docker run busybox".into()),
            docker_compose_snippet: Some(String::new()),
            ..Default::default()
        };
        let artifacts = generate(&extracted);
        assert!(artifacts.bash_script.contains("Attempting to run tool Docker container"));
        assert_eq!(artifacts.compose_script, NO_COMPOSE_PLACEHOLDER);
    }

    #[test]
    fn generation_is_deterministic() {
        let extracted = redis();
        assert_eq!(generate(&extracted), generate(&extracted));
    }

    #[test]
    fn artifacts_are_never_empty() {
        for extracted in [ExtractedContent::default(), redis()] {
            let artifacts = generate(&extracted);
            assert!(!artifacts.bash_script.is_empty());
            assert!(!artifacts.compose_script.is_empty());
        }
    }
}
