//! Application configuration for Quickstart.
//!
//! User config lives at `~/.quickstart/quickstart.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuickstartError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "quickstart.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".quickstart";

// ---------------------------------------------------------------------------
// Config structs (matching quickstart.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Page fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Content extractor settings.
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Component launcher settings.
    #[serde(default)]
    pub launcher: LauncherConfig,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total time bound for one page fetch, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every fetch.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    "QuickstartUniverseMVP/0.1".into()
}

/// `[extractor]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Extraction backend: "gemini" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for extraction.
    #[serde(default = "default_model")]
    pub model: String,

    /// Time bound for one extraction request, in seconds.
    #[serde(default = "default_extractor_timeout")]
    pub timeout_secs: u64,

    /// Page content budget sent to the model, in characters.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Override for the API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            timeout_secs: default_extractor_timeout(),
            max_content_chars: default_max_content_chars(),
            base_url: None,
        }
    }
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_extractor_timeout() -> u64 {
    60
}
fn default_max_content_chars() -> usize {
    30_000
}

/// `[launcher]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Directory holding one sub-directory per component. Defaults to the
    /// directory of the running binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components_dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.quickstart/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| QuickstartError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.quickstart/quickstart.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| QuickstartError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        QuickstartError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| QuickstartError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| QuickstartError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| QuickstartError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the extractor API key from the configured env var.
///
/// Returns `None` when the variable is unset or empty; the extractor then runs
/// in mock mode.
pub fn resolve_api_key(config: &ExtractorConfig) -> Option<String> {
    match std::env::var(&config.api_key_env) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("timeout_secs"));
        assert!(toml_str.contains("GEMINI_API_KEY"));
        assert!(toml_str.contains("QuickstartUniverseMVP/0.1"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 10);
        assert_eq!(parsed.extractor.api_key_env, "GEMINI_API_KEY");
        assert_eq!(parsed.extractor.provider, "gemini");
        assert!(parsed.launcher.components_dir.is_none());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[extractor]
provider = "mock"

[launcher]
components_dir = "/opt/components"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.extractor.provider, "mock");
        assert_eq!(config.extractor.model, "gemini-1.5-flash");
        assert_eq!(config.fetch.user_agent, "QuickstartUniverseMVP/0.1");
        assert_eq!(
            config.launcher.components_dir.as_deref(),
            Some("/opt/components")
        );
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!(
            "qs_config_test_{}.toml",
            uuid::Uuid::now_v7()
        ));
        std::fs::write(&path, "[fetch]\ntimeout_secs = \"ten\"\n").expect("write");
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_api_key_resolves_to_none() {
        let config = ExtractorConfig {
            // Use a unique env var name to avoid interfering with other tests
            api_key_env: "QS_TEST_NONEXISTENT_KEY_12345".into(),
            ..Default::default()
        };
        assert!(resolve_api_key(&config).is_none());
    }
}
