/**
 * INSPECTION API - HTTP view over the headless display
 *
 * ROLE:
 * Exposes what the map surface and UI regions currently show, and lets an
 * operator (or a kiosk front-end) click a marker by key.
 *
 * ROUTES:
 * - GET  /health                → "ok"
 * - GET  /view                  → DisplayView JSON
 * - POST /markers/{mmsi}/click  → queue a click for the poll loop
 *
 * Clicks are forwarded over a channel; the poll loop services them between
 * reconciles, so the handlers never touch reconciler state directly.
 */

use crate::headless::DisplayView;
use crate::map::MarkerClick;
use crate::models::Mmsi;
use crate::state::Shared;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub view: Shared<DisplayView>,
    pub clicks: mpsc::Sender<MarkerClick>,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/view", get(get_view))
        .route("/markers/{mmsi}/click", post(click_marker))
        .with_state(app_state)
}

// GET /view
async fn get_view(State(app): State<AppState>) -> Json<DisplayView> {
    Json(app.view.lock().clone())
}

// POST /markers/{mmsi}/click
async fn click_marker(State(app): State<AppState>, Path(mmsi): Path<String>) -> StatusCode {
    let mmsi = Mmsi::new(mmsi);
    let known = app.view.lock().marker_for(&mmsi).is_some();
    if !known {
        return StatusCode::NOT_FOUND;
    }
    debug!(%mmsi, "click queued");
    match app.clicks.send(MarkerClick { mmsi }).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessMap;
    use crate::map::{MapSurface, MarkerStyle};
    use crate::models::LatLon;
    use tokio::net::TcpListener;

    async fn serve(state: AppState) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn view_with_marker(mmsi: &str) -> Shared<DisplayView> {
        let view = DisplayView::shared(LatLon::new(46.777, -92.095), 14);
        let mut map = HeadlessMap::new(view.clone());
        let handle = map.place_marker(LatLon::new(46.78, -92.10), &MarkerStyle::for_vessel_type(Some("cargo")));
        map.attach_click(handle, mmsi.into());
        view
    }

    #[tokio::test]
    async fn test_health_and_view() {
        let (tx, _rx) = mpsc::channel(1);
        let base = serve(AppState { view: view_with_marker("1"), clicks: tx }).await;

        let health = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(health.text().await.unwrap(), "ok");

        let body = reqwest::get(format!("{base}/view")).await.unwrap().text().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["markers"][0]["mmsi"], "1");
        assert_eq!(json["markers"][0]["label"], "C");
    }

    #[tokio::test]
    async fn test_click_is_forwarded() {
        let (tx, mut rx) = mpsc::channel(1);
        let base = serve(AppState { view: view_with_marker("366123450"), clicks: tx }).await;
        let client = reqwest::Client::new();

        let accepted = client.post(format!("{base}/markers/366123450/click")).send().await.unwrap();
        assert_eq!(accepted.status().as_u16(), 202);
        assert_eq!(rx.recv().await, Some(MarkerClick::new("366123450")));

        let missing = client.post(format!("{base}/markers/999/click")).send().await.unwrap();
        assert_eq!(missing.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn test_click_after_loop_stopped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let base = serve(AppState { view: view_with_marker("1"), clicks: tx }).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/markers/1/click"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 503);
    }
}
