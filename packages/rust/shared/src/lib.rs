//! Shared types, error model, and configuration for Quickstart.
//!
//! This crate is the foundation depended on by all other Quickstart crates.
//! It provides:
//! - [`QuickstartError`]: the unified error type, plus [`ErrorKind`]
//! - Domain types ([`ExtractedContent`], [`GeneratedArtifacts`], [`PipelineResult`], [`RunId`])
//! - [`ValidatedUrl`] and the URL validator
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;
pub mod validate;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExtractorConfig, FetchConfig, LauncherConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{ErrorKind, QuickstartError, Result};
pub use types::{
    ExtractedContent, ExtractedInfo, GeneratedArtifacts, NO_TOOL_FOUND_KEY, PipelineResult, RunId,
};
pub use validate::{MAX_URL_LENGTH, ValidatedUrl, validate_url};
