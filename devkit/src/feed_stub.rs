/*!
HTTP feed stub

Tiny axum server on an ephemeral loopback port answering `GET /vessels`
with whatever the test last configured: a snapshot, raw bytes, or an error
status. Counts hits so tests can assert on round-trips.
*/

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use harborframe_display::VesselSnapshot;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct StubResponse {
    status: u16,
    body: String,
}

#[derive(Debug)]
struct StubState {
    response: StubResponse,
    hits: usize,
    delay: Option<Duration>,
}

#[derive(Clone)]
pub struct FeedStub {
    addr: SocketAddr,
    state: Arc<Mutex<StubState>>,
}

impl FeedStub {
    /// Bind on 127.0.0.1:0 and start serving. Starts out answering an
    /// empty snapshot.
    pub async fn start() -> Result<Self> {
        let state = Arc::new(Mutex::new(StubState {
            response: StubResponse { status: 200, body: r#"{"vessels": []}"#.to_string() },
            hits: 0,
            delay: None,
        }));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new().route("/vessels", get(vessels)).with_state(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("feed stub stopped: {}", e);
            }
        });
        log::info!("🛰️ Feed stub listening on http://{}", addr);
        Ok(Self { addr, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond_snapshot(&self, snapshot: &VesselSnapshot) -> Result<()> {
        let body = serde_json::to_string(snapshot)?;
        self.respond_raw(200, body);
        Ok(())
    }

    pub fn respond_json(&self, body: &Value) {
        self.respond_raw(200, body.to_string());
    }

    /// Error status with an empty JSON body.
    pub fn respond_status(&self, status: u16) {
        self.respond_raw(status, "{}");
    }

    pub fn respond_raw<S: Into<String>>(&self, status: u16, body: S) {
        self.state.lock().unwrap().response = StubResponse { status, body: body.into() };
    }

    /// Hold every response back by `delay` (simulates a slow feed).
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().unwrap().delay = delay;
    }

    pub fn hits(&self) -> usize {
        self.state.lock().unwrap().hits
    }
}

async fn vessels(State(state): State<Arc<Mutex<StubState>>>) -> impl IntoResponse {
    let (response, delay) = {
        let mut st = state.lock().unwrap();
        st.hits += 1;
        (st.response.clone(), st.delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], response.body)
}
