//! HarborFrame display host
//!
//! Bootstraps config and logging, then runs the poll loop against the
//! headless map and serves the inspection API next to it.

use anyhow::{Context, Result};
use harborframe_display::config::load_config;
use harborframe_display::headless::{DisplayView, HeadlessMap, HeadlessUi};
use harborframe_display::http::{build_router, AppState};
use harborframe_display::{FeedClient, LatLon, PollLoop};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CLICK_QUEUE: usize = 32;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("harborframe_display=info")),
        )
        .init();

    let cfg = load_config().await.context("Failed to load display config")?;
    info!(api_base = %cfg.api_base, period_secs = cfg.poll_interval_secs, "HarborFrame display starting");

    let view = DisplayView::shared(LatLon::new(cfg.map.center_lat, cfg.map.center_lon), cfg.map.zoom);
    let feed = FeedClient::new(&cfg.api_base, cfg.request_timeout()).context("Failed to build feed client")?;
    info!(url = %feed.url(), "polling feed");
    let (click_tx, click_rx) = mpsc::channel(CLICK_QUEUE);

    let listener = TcpListener::bind(&cfg.http.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.http.bind))?;
    info!(url = %format!("http://{}", cfg.http.bind), "inspection API listening");
    let app = build_router(AppState { view: view.clone(), clicks: click_tx });
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("inspection API stopped: {e}");
        }
    });

    let driver = PollLoop::new(
        feed,
        HeadlessMap::new(view.clone()),
        HeadlessUi::new(view),
        cfg.poll_interval(),
        cfg.labels.clone(),
    );

    tokio::select! {
        _ = driver.run(click_rx) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("shutdown requested");
        }
    }
    Ok(())
}
