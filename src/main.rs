// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::snapshot_cache::SnapshotCache;
use crate::infrastructure::config::{load_dashboard_config, read_key_from_env};
use crate::infrastructure::thingspeak_repository::ThingSpeakRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    channel_labels, health_check, list_metrics, list_thresholds, metric_view, refresh, summary,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let read_key = read_key_from_env();
    if read_key.is_none() {
        tracing::info!("No read key configured, channels must be public");
    }

    // Create repository (infrastructure layer)
    let repository = Arc::new(ThingSpeakRepository::new(
        config.feed.base_url.clone(),
        config.feed.timeout(),
    )?);

    // Create services (application layer)
    let cache = Arc::new(SnapshotCache::new(config.feed.cache_ttl()));
    let dashboard_service = DashboardService::new(
        repository,
        cache,
        config.channels,
        config.trend,
        config.feed.max_points,
        read_key,
    );

    let state = Arc::new(AppState {
        dashboard_service,
        view_defaults: config.view.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/summary", get(summary))
        .route("/thresholds", get(list_thresholds))
        .route("/metrics", get(list_metrics))
        .route("/metrics/:metric", get(metric_view))
        .route("/channels/:channel/labels", get(channel_labels))
        .route("/refresh", post(refresh))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting growth-chamber-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
