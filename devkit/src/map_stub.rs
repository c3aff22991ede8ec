/*!
Recording map surface and UI sinks

Stand-ins for the map widget and the page regions. Every call is logged so
tests can assert on the exact operations a reconcile issued, and the live
marker set can be compared before/after a tick.
*/

use harborframe_display::{LatLon, MapSurface, MarkerClick, MarkerHandle, MarkerStyle, Mmsi, UiSinks};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum MapOp {
    Place { handle: MarkerHandle, at: LatLon, label: String },
    Move { handle: MarkerHandle, to: LatLon },
    Remove { handle: MarkerHandle },
    AttachClick { handle: MarkerHandle, mmsi: Mmsi },
    Style { handle: MarkerHandle, selected: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMarker {
    pub mmsi: Option<Mmsi>,
    pub position: LatLon,
    pub label: String,
    pub selected: bool,
}

#[derive(Default)]
struct MapInner {
    next_id: u64,
    ops: Vec<MapOp>,
    live: BTreeMap<MarkerHandle, RecordedMarker>,
    unrendered: HashSet<MarkerHandle>,
}

/// Shared-handle map surface: clone it, hand one copy to the poll loop and
/// keep the other for assertions.
#[derive(Clone, Default)]
pub struct RecordingMap {
    inner: Arc<Mutex<MapInner>>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation issued so far, in order.
    pub fn ops(&self) -> Vec<MapOp> {
        self.inner.lock().unwrap().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.inner.lock().unwrap().ops.clear();
    }

    pub fn count_places(&self) -> usize {
        self.ops().iter().filter(|op| matches!(op, MapOp::Place { .. })).count()
    }

    pub fn count_moves(&self) -> usize {
        self.ops().iter().filter(|op| matches!(op, MapOp::Move { .. })).count()
    }

    pub fn count_removes(&self) -> usize {
        self.ops().iter().filter(|op| matches!(op, MapOp::Remove { .. })).count()
    }

    /// Markers currently on the surface.
    pub fn live(&self) -> BTreeMap<MarkerHandle, RecordedMarker> {
        self.inner.lock().unwrap().live.clone()
    }

    pub fn marker_for(&self, mmsi: &str) -> Option<(MarkerHandle, RecordedMarker)> {
        self.inner
            .lock()
            .unwrap()
            .live
            .iter()
            .find(|(_, m)| m.mmsi.as_ref().map(Mmsi::as_str) == Some(mmsi))
            .map(|(h, m)| (*h, m.clone()))
    }

    /// Simulate the user tapping the marker registered for `mmsi`.
    pub fn click(&self, mmsi: &str) -> Option<MarkerClick> {
        self.marker_for(mmsi)
            .and_then(|(_, marker)| marker.mmsi)
            .map(|mmsi| MarkerClick { mmsi })
    }

    /// Pretend the marker's DOM element has not been rendered yet.
    pub fn hide_element(&self, handle: MarkerHandle) {
        self.inner.lock().unwrap().unrendered.insert(handle);
    }
}

impl MapSurface for RecordingMap {
    fn place_marker(&mut self, at: LatLon, style: &MarkerStyle) -> MarkerHandle {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let handle = MarkerHandle::new(inner.next_id);
        inner.live.insert(
            handle,
            RecordedMarker { mmsi: None, position: at, label: style.label.clone(), selected: false },
        );
        inner.ops.push(MapOp::Place { handle, at, label: style.label.clone() });
        log::debug!("[MOCK] place {:?} at {:?}", handle, at);
        handle
    }

    fn move_marker(&mut self, handle: MarkerHandle, to: LatLon) {
        let mut inner = self.inner.lock().unwrap();
        match inner.live.get_mut(&handle) {
            Some(marker) => marker.position = to,
            None => panic!("move on released marker {:?}", handle),
        }
        inner.ops.push(MapOp::Move { handle, to });
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        let mut inner = self.inner.lock().unwrap();
        if inner.live.remove(&handle).is_none() {
            panic!("marker {:?} released twice", handle);
        }
        inner.ops.push(MapOp::Remove { handle });
    }

    fn attach_click(&mut self, handle: MarkerHandle, mmsi: Mmsi) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(marker) = inner.live.get_mut(&handle) {
            marker.mmsi = Some(mmsi.clone());
        }
        inner.ops.push(MapOp::AttachClick { handle, mmsi });
    }

    fn set_selected_style(&mut self, handle: MarkerHandle, selected: bool) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.unrendered.contains(&handle) {
            return false;
        }
        let Some(marker) = inner.live.get_mut(&handle) else {
            return false;
        };
        marker.selected = selected;
        inner.ops.push(MapOp::Style { handle, selected });
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub status: String,
    pub subtitle: String,
    pub last_updated: String,
    pub panel: String,
    pub panel_is_html: bool,
    pub writes: usize,
}

#[derive(Clone, Default)]
pub struct RecordingUi {
    state: Arc<Mutex<UiState>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UiState {
        self.state.lock().unwrap().clone()
    }

    fn write(&self, apply: impl FnOnce(&mut UiState)) {
        let mut state = self.state.lock().unwrap();
        apply(&mut state);
        state.writes += 1;
    }
}

impl UiSinks for RecordingUi {
    fn set_status(&mut self, text: &str) {
        self.write(|s| s.status = text.to_string());
    }

    fn set_subtitle(&mut self, text: &str) {
        self.write(|s| s.subtitle = text.to_string());
    }

    fn set_last_updated(&mut self, text: &str) {
        self.write(|s| s.last_updated = text.to_string());
    }

    fn set_panel_html(&mut self, html: &str) {
        self.write(|s| {
            s.panel = html.to_string();
            s.panel_is_html = true;
        });
    }

    fn set_panel_text(&mut self, text: &str) {
        self.write(|s| {
            s.panel = text.to_string();
            s.panel_is_html = false;
        });
    }
}
