use std::sync::Arc;

/// How a queued task ended, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Operation returned `Ok`.
    Success,
    /// Operation returned an error.
    Failure,
    /// Operation panicked; the queue kept going.
    Panicked,
}

impl TaskOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskOutcome::Success => "success",
            TaskOutcome::Failure => "failure",
            TaskOutcome::Panicked => "panicked",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a task accepted by `add_task`.
    ///
    /// # Arguments
    /// - `queue`: queue name
    fn record_task_enqueued(&self, queue: &str);
    /// Record task completion with outcome and duration.
    ///
    /// # Arguments
    /// - `queue`: queue name
    /// - `outcome`: how the task terminated
    /// - `duration_ms`: execution time in milliseconds
    fn record_task_completed(&self, queue: &str, outcome: TaskOutcome, duration_ms: u64);
    /// Record one scheduled retry of a wrapped operation.
    ///
    /// # Arguments
    /// - `operation`: name carried by the retry policy
    fn record_retry(&self, operation: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
