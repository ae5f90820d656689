use async_trait::async_trait;

use crate::{
    dto::{Diagnostics, MockupResponse, MockupSubmission},
    error::ApiError,
};

/// Backend of the HTTP routes.
///
/// [`crate::LeadFlowHandler`] is the production implementation; tests and
/// embedders can provide their own.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Render the mockup for a submission and schedule the CRM side effects.
    async fn submit_mockup(&self, submission: MockupSubmission) -> Result<MockupResponse, ApiError>;

    /// Background queue state.
    async fn diagnostics(&self) -> Result<Diagnostics, ApiError>;

    /// Metrics in the Prometheus text format.
    async fn metrics(&self) -> Result<String, ApiError>;
}
