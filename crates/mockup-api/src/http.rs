use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use mockup_prometheus::{Encoder, TextEncoder};

use crate::{dto::MockupSubmission, error::ApiError, handler::ApiHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Routes:
    /// - POST /api/mockup - render a mockup and queue the lead sync
    /// - GET /api/diagnostics - task queue counters
    /// - GET /metrics - Prometheus exposition
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/mockup", post(submit_mockup::<H>))
            .route("/api/diagnostics", get(diagnostics::<H>))
            .route("/metrics", get(metrics::<H>))
            .with_state(self.handler)
    }
}

/// POST /api/mockup
async fn submit_mockup<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<MockupSubmission>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.submit_mockup(req).await?))
}

/// GET /api/diagnostics
async fn diagnostics<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.diagnostics().await?))
}

/// GET /metrics
async fn metrics<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let body = handler.metrics().await?;
    let content_type = TextEncoder::new().format_type().to_string();
    Ok(([(header::CONTENT_TYPE, content_type)], body))
}
