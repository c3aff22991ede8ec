//! Feed client for the collector's `/vessels` endpoint
//!
//! One call, one full round-trip: no retry, no caching. The poll loop's
//! period is the retry mechanism. Any failure yields no snapshot at all.

use crate::models::VesselSnapshot;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed answered HTTP {0}")]
    Status(u16),

    #[error("feed client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("feed unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("malformed feed document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FeedError {
    /// Non-success status or no usable response at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, FeedError::Status(_) | FeedError::Unreachable(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FeedError::Decode(_))
    }
}

/// Anything the poll loop can pull a snapshot from.
pub trait SnapshotSource {
    fn fetch_snapshot(&self) -> impl Future<Output = Result<VesselSnapshot, FeedError>> + Send;
}

#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    url: String,
}

impl FeedClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, FeedError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("harborframe-display/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(FeedError::Client)?;

        Ok(Self {
            http,
            url: vessels_url(base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SnapshotSource for FeedClient {
    async fn fetch_snapshot(&self) -> Result<VesselSnapshot, FeedError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(FeedError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FeedError::Unreachable)?;
        let snapshot: VesselSnapshot = serde_json::from_slice(&body)?;
        debug!(vessels = snapshot.vessels.len(), "fetched snapshot");
        Ok(snapshot)
    }
}

fn vessels_url(base_url: &str) -> String {
    format!("{}/vessels", base_url.trim_end_matches('/'))
}
