use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

use mockup_core::{CoreError, LeadSync, MockupRenderer, RenderRequest};
use mockup_model::{LogoKind, placeholder_mockup_url};
use mockup_prometheus::PrometheusMetrics;

use crate::{
    dto::{Diagnostics, MockupResponse, MockupSubmission},
    error::ApiError,
    handler::ApiHandler,
};

/// [`ApiHandler`] over the renderer and the lead sync service.
///
/// Rendering happens inside the request; CRM writes are only queued, so their
/// failures never reach the client.
pub struct LeadFlowHandler {
    renderer: MockupRenderer,
    sync: LeadSync,
    redirect_url: Option<String>,
    metrics: Option<PrometheusMetrics>,
}

impl LeadFlowHandler {
    pub fn new(renderer: MockupRenderer, sync: LeadSync) -> Self {
        Self {
            renderer,
            sync,
            redirect_url: None,
            metrics: None,
        }
    }

    /// Page the client is sent to after submitting.
    pub fn with_redirect_url(mut self, url: Option<String>) -> Self {
        self.redirect_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_metrics(mut self, metrics: PrometheusMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn sync(&self) -> &LeadSync {
        &self.sync
    }

    /// Queue basic info, mockup URL and logo URL updates for the lead.
    ///
    /// Failures are logged and never reach the client: the mockup is already rendered.
    fn schedule_sync(&self, sub: &MockupSubmission, rendered_url: Option<&str>) {
        let email = sub.email.trim();
        if let Err(e) = self.sync.process_lead_basic_info_async(sub.lead()) {
            error!(email, error = %e, "lead sync not queued");
        }

        if let Some(url) = rendered_url {
            match self.sync.update_mockup_url_async(email, url) {
                Ok(_) => {}
                Err(CoreError::Model(e)) => {
                    warn!(email, url, error = %e, "rendered url not storable, skipping crm update")
                }
                Err(e) => error!(email, error = %e, "mockup url update not queued"),
            }
        }

        let logo = sub
            .original_logo_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&sub.logo_url);
        if let Err(e) = self.sync.update_logo_url_async(email, logo) {
            error!(email, error = %e, "logo url update not queued");
        }
    }
}

#[async_trait]
impl ApiHandler for LeadFlowHandler {
    #[instrument(level = "info", skip_all, fields(email = %submission.email))]
    async fn submit_mockup(&self, submission: MockupSubmission) -> Result<MockupResponse, ApiError> {
        let lead = submission.lead();
        lead.validate()?;
        if submission.logo_url.trim().is_empty() {
            return Err(ApiError::InvalidRequest("logoUrl is required".into()));
        }

        let kind = LogoKind::detect(&submission.logo_url, submission.file_type.as_deref());
        let req = RenderRequest::new(submission.logo_url.trim(), &lead, kind);
        let rendered = self.renderer.render(&req).await?;

        let url = match &rendered {
            Some(m) => m.url.clone(),
            None => placeholder_mockup_url(&lead.email, &self.sync.config().location),
        };
        self.schedule_sync(&submission, rendered.as_ref().map(|m| m.url.as_str()));
        info!(url = %url, placeholder = rendered.is_none(), "mockup request served");

        Ok(MockupResponse {
            success: true,
            email: lead.email,
            name: submission.name,
            phone: submission.phone,
            segmento: submission.segmento,
            logo_url: submission.logo_url,
            original_logo_url: submission.original_logo_url,
            url,
            redirect_url: self.redirect_url.clone(),
        })
    }

    async fn diagnostics(&self) -> Result<Diagnostics, ApiError> {
        let queue = self.sync.queue();
        Ok(Diagnostics {
            queue_name: queue.name().to_string(),
            queue: queue.stats(),
        })
    }

    async fn metrics(&self) -> Result<String, ApiError> {
        match &self.metrics {
            Some(m) => m.encode_text().map_err(|e| ApiError::Internal(e.to_string())),
            None => Ok(String::new()),
        }
    }
}
