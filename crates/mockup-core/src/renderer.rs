use std::sync::Arc;

use mockup_model::RetryStrategy;
use tracing::{info, instrument, warn};

use crate::{
    error::CoreError,
    metrics::MetricsHandle,
    ports::{RenderBackend, RenderError, RenderRequest, RenderedMockup},
    retry::{RetryPolicy, with_retry},
};

/// Rendering backend wrapped with retry on transient failures.
///
/// Network errors, timeouts and 5xx responses are retried with the render preset
/// (2 retries, 500ms..2s); anything else fails at once.
#[derive(Clone)]
pub struct MockupRenderer {
    backend: Arc<dyn RenderBackend>,
    policy: RetryPolicy<RenderError>,
}

impl MockupRenderer {
    pub fn new(backend: Arc<dyn RenderBackend>) -> Self {
        Self::with_policy(backend, RetryPolicy::from_checked(&RetryStrategy::render_backend()))
    }

    /// Fails when `strategy` does not validate.
    pub fn with_strategy(
        backend: Arc<dyn RenderBackend>,
        strategy: &RetryStrategy,
    ) -> Result<Self, CoreError> {
        Ok(Self::with_policy(backend, RetryPolicy::from_strategy(strategy)?))
    }

    fn with_policy(backend: Arc<dyn RenderBackend>, policy: RetryPolicy<RenderError>) -> Self {
        let policy = policy
            .named("render-backend")
            .with_should_retry(RenderError::is_retryable);
        Self { backend, policy }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.policy = self.policy.with_metrics(metrics);
        self
    }

    pub fn policy(&self) -> &RetryPolicy<RenderError> {
        &self.policy
    }

    /// Render a mockup, retrying transient failures.
    #[instrument(level = "debug", skip(self, req), fields(email = %req.email, is_pdf = req.is_pdf))]
    pub async fn render(&self, req: &RenderRequest) -> Result<Option<RenderedMockup>, RenderError> {
        let res = with_retry(|| self.backend.render_mockup(req), &self.policy).await;
        match &res {
            Ok(Some(m)) => info!(url = %m.url, "mockup rendered"),
            Ok(None) => warn!("render backend produced no mockup"),
            Err(e) => warn!(error = %e, "mockup render failed"),
        }
        res
    }
}
