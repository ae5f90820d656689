use async_trait::async_trait;
use mockup_model::{LeadFields, LogoKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload sent to the rendering backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub logo_url: String,
    pub email: String,
    pub name: String,
    pub is_pdf: bool,
}

impl RenderRequest {
    /// Build from a lead. The logo kind is detected from the URL unless `kind` is given.
    pub fn new(logo_url: impl Into<String>, lead: &LeadFields, kind: Option<LogoKind>) -> Self {
        let logo_url = logo_url.into();
        let is_pdf = kind
            .or_else(|| LogoKind::detect(&logo_url, None))
            .is_some_and(|k| k.is_pdf());
        Self {
            email: lead.email.clone(),
            name: lead.name.clone().unwrap_or_default(),
            logo_url,
            is_pdf,
        }
    }
}

/// Result of a successful render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMockup {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render backend unreachable: {0}")]
    Network(String),

    #[error("render backend timed out")]
    Timeout,

    #[error("render backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("render backend failed: {0}")]
    Execution(String),

    #[error("cannot decode render response: {0}")]
    Decode(String),

    #[error("invalid render backend configuration: {0}")]
    Config(String),
}

impl RenderError {
    /// Network errors, timeouts and 5xx responses; everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            RenderError::Network(_) | RenderError::Timeout => true,
            RenderError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Serverless mockup rendering.
#[async_trait]
pub trait RenderBackend: Send + Sync + 'static {
    /// Render a mockup for `req`. `Ok(None)` when the backend produced no mockup
    /// without an error worth surfacing (killed for resources, or no URL returned).
    async fn render_mockup(&self, req: &RenderRequest) -> Result<Option<RenderedMockup>, RenderError>;
}
