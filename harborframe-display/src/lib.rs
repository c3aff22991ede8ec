//! HarborFrame display core
//!
//! Polls the collector's vessel feed on a fixed period and reconciles a set
//! of map markers against each snapshot:
//! - create markers for new vessels, move known ones in place, drop stale ones
//! - keep the selected vessel's detail panel live across refreshes
//! - on feed failure, keep what is on screen and flip the status to offline
//!
//! The map widget and the UI regions are collaborators behind `MapSurface`
//! and `UiSinks`; `headless` provides in-process implementations of both.

pub mod config;
pub mod feed;
pub mod headless;
pub mod http;
pub mod map;
pub mod models;
pub mod panel;
pub mod poll;
pub mod reconciler;
pub mod state;

pub use feed::{FeedClient, FeedError, SnapshotSource};
pub use map::{MapSurface, MarkerClick, MarkerHandle, MarkerStyle};
pub use models::{BoundingBox, LatLon, Mmsi, VesselRecord, VesselSnapshot};
pub use panel::{UiSinks, PLACEHOLDER_TEXT};
pub use poll::{PollLoop, StatusLabels, TickOutcome};
pub use reconciler::{ReconcileReport, Reconciler};
