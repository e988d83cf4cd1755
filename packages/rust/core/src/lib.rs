//! Pipeline orchestration for Quickstart.
//!
//! This crate ties together URL validation, page fetching, content extraction,
//! and artifact generation into a single run ([`pipeline::Pipeline::run`]).
//! It also hosts the unrelated component [`launcher`].

pub mod launcher;
pub mod pipeline;
pub mod tracer;

pub use pipeline::{NO_TOOL_MESSAGE, Pipeline, ProgressReporter, SilentProgress};
pub use tracer::StepTracer;
