//! End-to-end pipeline: URL → validate → fetch → extract → generate artifacts.
//!
//! A run is strictly sequential and never returns an error: every stage failure
//! is converted into the `error` field of the [`PipelineResult`], together with
//! whatever partial data earlier stages produced and the full step trace.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tracing::{debug, error, info, instrument};

use quickstart_extractor::ContentExtractor;
use quickstart_fetcher::{FetchOptions, PageFetcher};
use quickstart_shared::{
    AppConfig, ExtractedInfo, PipelineResult, QuickstartError, Result, RunId, validate_url,
};

use crate::tracer::StepTracer;

/// Note attached to the extracted summary when the extractor recognized no tool.
pub const NO_TOOL_MESSAGE: &str = "No specific tool recognized by content extractor.";

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called for every step recorded in the trace, in order.
    fn step(&self, message: &str);
    /// Called once with the final result.
    fn done(&self, result: &PipelineResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn step(&self, _message: &str) {}
    fn done(&self, _result: &PipelineResult) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The extraction-and-bootstrap pipeline.
///
/// Holds only collaborators that are safe to share, so one `Pipeline` can
/// serve any number of concurrent runs.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: PageFetcher,
    extractor: Arc<dyn ContentExtractor>,
}

impl Pipeline {
    /// Create a pipeline from its collaborators.
    pub fn new(fetcher: PageFetcher, extractor: Arc<dyn ContentExtractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// Build the fetcher and extractor described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = PageFetcher::new(&FetchOptions::from(&config.fetch))?;
        let extractor = quickstart_extractor::build_extractor(&config.extractor)?;
        Ok(Self::new(fetcher, extractor))
    }

    /// Name of the injected extractor.
    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    /// Process one submitted URL.
    pub async fn run(&self, raw_url: &str) -> PipelineResult {
        self.run_with_progress(raw_url, &SilentProgress).await
    }

    /// Process one submitted URL, forwarding every step to `progress`.
    #[instrument(skip_all, fields(url = %raw_url))]
    pub async fn run_with_progress(
        &self,
        raw_url: &str,
        progress: &dyn ProgressReporter,
    ) -> PipelineResult {
        let start = Instant::now();
        let mut run = Run::new(RunId::new(), raw_url, progress);

        info!(run_id = %run.result.run_id, extractor = self.extractor.name(), "starting pipeline run");

        if let Err(err) = self.execute(raw_url, &mut run).await {
            run.fail(err);
        }

        let result = run.finish();
        progress.done(&result);

        info!(
            run_id = %result.run_id,
            ok = !result.is_error(),
            steps = result.steps.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "pipeline run complete"
        );

        result
    }

    /// The stage sequence. Returns at the first failure.
    async fn execute(&self, raw_url: &str, run: &mut Run<'_>) -> Result<()> {
        // --- Validate ---
        run.step(format!("Attempting to fetch content from: {raw_url}"));
        let url = validate_url(raw_url)?;
        run.step(format!("URL validated: {url}"));

        // --- Fetch ---
        let page = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|e| e.with_submitted_url(raw_url))?;
        run.result.snippet = Some(page.snippet);
        run.step("Successfully fetched content snippet.");

        // --- Extract ---
        let name = self.extractor.name();
        run.step(format!("Calling ContentExtractor ({name}) for URL: {url}"));
        let extracted = AssertUnwindSafe(self.extractor.extract(&page.body, &url))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(QuickstartError::extraction(format!(
                    "extractor panicked: {}",
                    panic_message(&*payload)
                )))
            })
            .map_err(as_extraction_failure)?
            .normalized();
        run.step(format!(
            "ContentExtractor ({name}) finished. Tool identified: {}",
            extracted.tool_name.as_deref().unwrap_or("None")
        ));

        // --- Generate ---
        let artifacts = quickstart_artifacts::generate(&extracted);
        if extracted.docker_run_command.is_some() {
            run.step("Generated Bash script placeholder.");
        } else {
            run.step("No Bash script generated (no docker_run_command).");
        }
        if extracted.docker_compose_snippet.is_some() {
            run.step("Using Docker Compose snippet from extractor.");
        } else {
            run.step("No Docker Compose snippet found.");
        }

        let mut info = ExtractedInfo::from(extracted);
        if info.content.tool_name.is_none() && info.content.no_tool_found() {
            info.message = Some(NO_TOOL_MESSAGE.to_string());
        }

        run.result.extracted = Some(info);
        run.result.artifacts = Some(artifacts);
        Ok(())
    }
}

/// Every failure out of the extraction stage is reported the same way.
fn as_extraction_failure(err: QuickstartError) -> QuickstartError {
    match err {
        QuickstartError::Extraction { .. } => err,
        other => QuickstartError::extraction(other.to_string()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// Per-run state
// ---------------------------------------------------------------------------

/// State owned by a single run: its tracer, its partial result, its observer.
struct Run<'a> {
    tracer: StepTracer,
    result: PipelineResult,
    progress: &'a dyn ProgressReporter,
}

impl<'a> Run<'a> {
    fn new(run_id: RunId, raw_url: &str, progress: &'a dyn ProgressReporter) -> Self {
        Self {
            tracer: StepTracer::new(),
            result: PipelineResult::new(run_id, raw_url),
            progress,
        }
    }

    fn step(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(step = %message);
        self.progress.step(&message);
        self.tracer.record(message);
    }

    fn fail(&mut self, err: QuickstartError) {
        error!(kind = ?err.kind(), error = %err, "pipeline stage failed");
        self.step(err.trace_entry());
        self.result.error = Some(err.user_message());
        self.result.error_kind = Some(err.kind());
    }

    fn finish(self) -> PipelineResult {
        let mut result = self.result;
        result.steps = self.tracer.into_steps();
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
