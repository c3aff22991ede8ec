/*!
Test harness for the display poll loop

Wires a `FeedStub`, a `RecordingMap` and a `RecordingUi` into a real
`PollLoop<FeedClient, ..>` so scenarios run over actual HTTP.
*/

use crate::feed_stub::FeedStub;
use crate::map_stub::{RecordingMap, RecordingUi};
use crate::snapshot_builder::SnapshotBuilder;
use anyhow::Result;
use harborframe_display::{FeedClient, PollLoop, StatusLabels, TickOutcome};
use std::time::Duration;

pub type HarnessLoop = PollLoop<FeedClient, RecordingMap, RecordingUi>;

pub struct TestHarness {
    pub feed: FeedStub,
    pub map: RecordingMap,
    pub ui: RecordingUi,
    pub period: Duration,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        env_logger::try_init().ok();

        Ok(Self {
            feed: FeedStub::start().await?,
            map: RecordingMap::new(),
            ui: RecordingUi::new(),
            period: Duration::from_millis(50),
        })
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// A poll loop sharing this harness' map and UI recorders.
    pub fn poll_loop(&self) -> Result<HarnessLoop> {
        let client = FeedClient::new(&self.feed.base_url(), Some(Duration::from_secs(5)))?;
        Ok(PollLoop::new(
            client,
            self.map.clone(),
            self.ui.clone(),
            self.period,
            StatusLabels::default(),
        ))
    }

    /// Serve `snapshot` and run one tick.
    pub async fn tick_with(&self, driver: &mut HarnessLoop, snapshot: SnapshotBuilder) -> Result<TickOutcome> {
        self.feed.respond_snapshot(&snapshot.build())?;
        let outcome = driver.tick().await;
        log::info!("🔁 Tick {} -> {:?}", driver.ticks(), outcome);
        Ok(outcome)
    }

    /// Poll `check` until it holds or `timeout_ms` elapses.
    pub async fn wait_until<F>(&self, timeout_ms: u64, mut check: F) -> bool
    where
        F: FnMut(&Self) -> bool,
    {
        let start = std::time::Instant::now();
        while start.elapsed() < Duration::from_millis(timeout_ms) {
            if check(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        log::warn!("⏰ Timeout waiting for condition");
        check(self)
    }
}
