mod config;

use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use mockup_api::{HttpApi, LeadFlowHandler};
use mockup_clients::{ActiveCampaignClient, LambdaRenderBackend};
use mockup_core::{LeadSync, MetricsHandle, MockupRenderer, TaskQueue};
use mockup_observe::{LoggerConfig, init_logger};
use mockup_prometheus::PrometheusMetrics;

use config::AppConfig;

/// Time given to queued CRM writes after the listener stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // logger goes first: a local log timezone is only detectable while single-threaded
    init_logger(&LoggerConfig::from_env()?)?;
    let cfg = AppConfig::from_env()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cfg))
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let metrics = PrometheusMetrics::new()?;
    let handle: MetricsHandle = Arc::new(metrics.clone());

    let backend = LambdaRenderBackend::new(cfg.lambda.clone())?;
    let renderer = MockupRenderer::new(Arc::new(backend)).with_metrics(handle.clone());

    let crm = ActiveCampaignClient::new(cfg.crm.clone())?;
    if let Err(e) = crm.verify_credentials().await {
        warn!(error = %e, "crm credentials check failed, lead sync will likely fail");
    }

    let sync = LeadSync::new(
        TaskQueue::with_metrics("crm", handle),
        Arc::new(crm),
        cfg.sync.clone(),
    );
    let handler = LeadFlowHandler::new(renderer, sync.clone())
        .with_redirect_url(cfg.redirect_url.clone())
        .with_metrics(metrics);
    let app = HttpApi::new(Arc::new(handler)).router();

    let listener = tokio::net::TcpListener::bind(cfg.listen_addr).await?;
    info!(addr = %cfg.listen_addr, bucket = %cfg.sync.location.bucket, "mockup server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(pending = sync.queue().stats().pending, "draining task queue");
    if tokio::time::timeout(DRAIN_TIMEOUT, sync.queue().wait_idle())
        .await
        .is_err()
    {
        warn!(stats = ?sync.queue().stats(), "task queue not drained, pending tasks are lost");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
