//! Append-only step trace for one pipeline run.

/// Ordered, human-readable log of what a run did.
///
/// One tracer belongs to exactly one run; it is never shared.
#[derive(Debug, Clone, Default)]
pub struct StepTracer {
    steps: Vec<String>,
}

impl StepTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, preserving call order.
    pub fn record(&mut self, message: impl Into<String>) {
        self.steps.push(message.into());
    }

    /// Copy of the steps recorded so far.
    pub fn snapshot(&self) -> Vec<String> {
        self.steps.clone()
    }

    /// Consume the tracer, yielding its steps.
    pub fn into_steps(self) -> Vec<String> {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Most recent step.
    pub fn last(&self) -> Option<&str> {
        self.steps.last().map(String::as_str)
    }
}
