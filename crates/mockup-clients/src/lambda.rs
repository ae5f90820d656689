use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use mockup_core::{RenderBackend, RenderError, RenderRequest, RenderedMockup};

/// Default per-request timeout of a render call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub endpoint: String,
    /// Sent as `x-api-key` when set.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl LambdaConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Rendering backend reached with a single JSON `POST`.
///
/// Does not retry; wrap it in `mockup_core::MockupRenderer` for that.
pub struct LambdaRenderBackend {
    http: reqwest::Client,
    cfg: LambdaConfig,
}

impl LambdaRenderBackend {
    pub fn new(cfg: LambdaConfig) -> Result<Self, RenderError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| RenderError::Config(e.to_string()))?;
        Ok(Self { http, cfg })
    }

    pub fn config(&self) -> &LambdaConfig {
        &self.cfg
    }
}

#[async_trait]
impl RenderBackend for LambdaRenderBackend {
    async fn render_mockup(&self, req: &RenderRequest) -> Result<Option<RenderedMockup>, RenderError> {
        let mut call = self.http.post(&self.cfg.endpoint).json(req);
        if let Some(key) = &self.cfg.api_key {
            call = call.header("x-api-key", key);
        }

        let resp = call.send().await.map_err(transport_error)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RenderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout
            } else {
                RenderError::Decode(e.to_string())
            }
        })?;
        debug!(email = %req.email, "render backend answered");
        parse_render_response(&body)
    }
}

fn transport_error(e: reqwest::Error) -> RenderError {
    if e.is_timeout() {
        RenderError::Timeout
    } else {
        RenderError::Network(e.to_string())
    }
}

/// Extract the mockup from a render response.
///
/// The URL is taken from `mockupUrl` or `url` at the top level, then from
/// `mockupUrl`, `directUrl` or `url` inside an API-gateway `body` (object or JSON
/// string). A function error whose message mentions `signal: killed` means the
/// render ran out of resources and yields `Ok(None)`; any other function error is
/// an [`RenderError::Execution`]. A response without a URL yields `Ok(None)`.
pub fn parse_render_response(body: &Value) -> Result<Option<RenderedMockup>, RenderError> {
    if let Some(kind) = body.get("errorType").and_then(Value::as_str) {
        let message = body
            .get("errorMessage")
            .and_then(Value::as_str)
            .unwrap_or(kind);
        if message.contains("signal: killed") {
            warn!(error = %message, "render backend was killed, no mockup produced");
            return Ok(None);
        }
        return Err(RenderError::Execution(message.to_string()));
    }

    let inner = match body.get("body") {
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "render response body is not json");
                None
            }
        },
        Some(v @ Value::Object(_)) => Some(v.clone()),
        _ => None,
    };
    let inner = inner.as_ref();

    let url = text_field(body, &["mockupUrl", "url"])
        .or_else(|| inner.and_then(|b| text_field(b, &["mockupUrl", "directUrl", "url"])));
    let Some(url) = url else {
        warn!("render response carries no mockup url");
        return Ok(None);
    };

    Ok(Some(RenderedMockup {
        url,
        key: text_field(body, &["mockupKey"]).or_else(|| inner.and_then(|b| text_field(b, &["mockupKey"]))),
        timestamp: text_field(body, &["timestamp"])
            .or_else(|| inner.and_then(|b| text_field(b, &["timestamp"]))),
    }))
}

/// First non-empty string (or number) among `keys`.
fn text_field(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match v.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
