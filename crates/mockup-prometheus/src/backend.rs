use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use mockup_core::{MetricsBackend, TaskOutcome};

const NAMESPACE: &str = "mockup";

/// Prometheus implementation of [`MetricsBackend`].
///
/// Labels stay low-cardinality: `queue` and `operation` are fixed names chosen in
/// code, `outcome` is one of `success`, `failure`, `panicked`.
#[derive(Clone)]
pub struct PrometheusMetrics {
    tasks_enqueued: CounterVec,
    tasks_completed: CounterVec,
    task_duration: HistogramVec,
    retries: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let tasks_enqueued = CounterVec::new(
            Opts::new("tasks_enqueued_total", "Background tasks accepted by a queue")
                .namespace(NAMESPACE),
            &["queue"],
        )?;
        registry.register(Box::new(tasks_enqueued.clone()))?;

        let tasks_completed = CounterVec::new(
            Opts::new("tasks_completed_total", "Background tasks finished, by outcome")
                .namespace(NAMESPACE),
            &["queue", "outcome"],
        )?;
        registry.register(Box::new(tasks_completed.clone()))?;

        let task_duration = HistogramVec::new(
            HistogramOpts::new("task_duration_seconds", "Background task run time in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["queue"],
        )?;
        registry.register(Box::new(task_duration.clone()))?;

        let retries = CounterVec::new(
            Opts::new("retries_total", "Retries scheduled by the retry executor")
                .namespace(NAMESPACE),
            &["operation"],
        )?;
        registry.register(Box::new(retries.clone()))?;

        Ok(Self {
            tasks_enqueued,
            tasks_completed,
            task_duration,
            retries,
            registry,
        })
    }

    /// Backend with a private registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render every registered family in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_task_enqueued(&self, queue: &str) {
        self.tasks_enqueued.with_label_values(&[queue]).inc();
    }

    fn record_task_completed(&self, queue: &str, outcome: TaskOutcome, duration_ms: u64) {
        self.tasks_completed
            .with_label_values(&[queue, outcome.as_label()])
            .inc();
        self.task_duration
            .with_label_values(&[queue])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_retry(&self, operation: &str) {
        self.retries.with_label_values(&[operation]).inc();
    }
}
