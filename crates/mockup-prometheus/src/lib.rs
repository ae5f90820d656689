//! Prometheus backend for the queue and retry metrics of `mockup-core`.
//!
//! ## Metrics
//! - `mockup_tasks_enqueued_total{queue}` - Counter
//! - `mockup_tasks_completed_total{queue, outcome}` - Counter
//! - `mockup_task_duration_seconds{queue}` - Histogram
//! - `mockup_retries_total{operation}` - Counter
//!
//! The crate does not serve HTTP; call [`PrometheusMetrics::encode_text`] from a handler.
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
