//! Poll loop driver
//!
//! Ticks are strictly sequential: the period sleep only starts once the
//! previous tick (fetch, reconcile, panel refresh) has finished. Clicks are
//! serviced while the fetch is in flight and while sleeping, never in the
//! middle of a reconcile.

use crate::feed::{FeedError, SnapshotSource};
use crate::map::{MapSurface, MarkerClick};
use crate::models::VesselSnapshot;
use crate::panel::{last_updated_text, subtitle_text, UiSinks, PLACEHOLDER_TEXT};
use crate::reconciler::{ReconcileReport, Reconciler};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLabels {
    pub live: String,
    pub offline: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            live: "Live (dev)".into(),
            offline: "Offline (dev)".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Applied(ReconcileReport),
    Offline,
}

pub struct PollLoop<S, M, U> {
    source: S,
    map: M,
    ui: U,
    reconciler: Reconciler,
    period: Duration,
    labels: StatusLabels,
    ticks: u64,
}

impl<S, M, U> PollLoop<S, M, U>
where
    S: SnapshotSource,
    M: MapSurface,
    U: UiSinks,
{
    pub fn new(source: S, map: M, mut ui: U, period: Duration, labels: StatusLabels) -> Self {
        ui.set_panel_text(PLACEHOLDER_TEXT);
        Self {
            source,
            map,
            ui,
            reconciler: Reconciler::new(),
            period,
            labels,
            ticks: 0,
        }
    }

    /// Run one tick to completion.
    pub async fn tick(&mut self) -> TickOutcome {
        let result = self.source.fetch_snapshot().await;
        self.apply(result)
    }

    fn apply(&mut self, result: Result<VesselSnapshot, FeedError>) -> TickOutcome {
        self.ticks += 1;
        match result {
            Ok(snapshot) => {
                self.ui.set_subtitle(subtitle_text(&snapshot));
                self.ui.set_last_updated(&last_updated_text(&snapshot));
                let report = self.reconciler.reconcile(&snapshot, &mut self.map, &mut self.ui);
                self.ui.set_status(&self.labels.live);
                debug!(tick = self.ticks, vessels = snapshot.vessels.len(), "tick applied");
                TickOutcome::Applied(report)
            }
            Err(e) => {
                // Stale-but-present: markers and selection stay as they were.
                warn!(tick = self.ticks, error = %e, "feed unavailable, keeping previous markers");
                self.ui.set_status(&self.labels.offline);
                TickOutcome::Offline
            }
        }
    }

    pub fn handle_click(&mut self, click: MarkerClick) -> bool {
        self.reconciler.select(&click.mmsi, &mut self.map, &mut self.ui)
    }

    /// Tick once while still servicing clicks during the fetch.
    pub async fn tick_with_clicks(&mut self, clicks: &mut mpsc::Receiver<MarkerClick>) -> TickOutcome {
        let result = {
            let fetch = self.source.fetch_snapshot();
            tokio::pin!(fetch);
            loop {
                tokio::select! {
                    result = &mut fetch => break result,
                    Some(click) = clicks.recv() => {
                        self.reconciler.select(&click.mmsi, &mut self.map, &mut self.ui);
                    }
                }
            }
        };
        self.apply(result)
    }

    async fn idle(&mut self, clicks: &mut mpsc::Receiver<MarkerClick>) {
        let sleep = tokio::time::sleep(self.period);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return,
                Some(click) = clicks.recv() => {
                    self.handle_click(click);
                }
            }
        }
    }

    /// Poll forever. The first tick runs immediately.
    pub async fn run(mut self, mut clicks: mpsc::Receiver<MarkerClick>) {
        info!(period = ?self.period, "poll loop started");
        loop {
            self.tick_with_clicks(&mut clicks).await;
            self.idle(&mut clicks).await;
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
