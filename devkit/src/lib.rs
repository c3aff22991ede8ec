/*!
# HarborFrame DevKit - Stubs and helpers for display tests

Lets the display be exercised without a browser or a collector:
- Recording map surface and UI sinks with an operation log
- HTTP feed stub serving programmable `/vessels` responses
- Builders for snapshots and vessel records
- `TestHarness` wiring all of the above into a poll loop
*/

pub mod feed_stub;
pub mod map_stub;
pub mod snapshot_builder;
pub mod test_utils;

pub use feed_stub::FeedStub;
pub use map_stub::{MapOp, RecordedMarker, RecordingMap, RecordingUi, UiState};
pub use snapshot_builder::{SnapshotBuilder, VesselBuilder};
pub use test_utils::TestHarness;
