//! Core of the mockup lead flow.
//!
//! - [`retry`]: exponential, jittered retry of a single fallible async operation.
//! - [`queue`]: single-worker FIFO queue for fire-and-forget side effects.
//! - [`ports`]: interfaces of the CRM and rendering backend collaborators.
//! - [`MockupRenderer`] and [`LeadSync`]: the two compositions the request path uses.
pub mod error;
pub mod metrics;
pub mod ports;
pub mod queue;
pub mod retry;

mod renderer;
pub use renderer::MockupRenderer;

mod sync;
pub use sync::{LeadSync, LeadSyncConfig};

pub use error::CoreError;
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, TaskOutcome, noop_metrics};
pub use ports::{
    ContactId, CrmClient, CrmError, RenderBackend, RenderError, RenderRequest, RenderedMockup,
};
pub use queue::{QueueStats, TaskId, TaskQueue};
pub use retry::{RetryPolicy, Retrying, retrying, with_retry};

pub mod prelude {
    pub use crate::error::CoreError;
    pub use crate::ports::{CrmClient, RenderBackend};
    pub use crate::queue::TaskQueue;
    pub use crate::retry::{RetryPolicy, with_retry};
    pub use crate::{LeadSync, MockupRenderer};
}
