//! Headless map + UI collaborators
//!
//! In-process `MapSurface` and `UiSinks` that publish into a shared
//! `DisplayView` instead of a browser. The poll loop is the only writer; the
//! HTTP layer reads the view (and queues clicks) from other tasks, hence the
//! mutex.

use crate::map::{MapSurface, MarkerHandle, MarkerStyle};
use crate::models::{LatLon, Mmsi};
use crate::panel::{UiSinks, PLACEHOLDER_TEXT};
use crate::state::{new_state, Shared};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub handle: MarkerHandle,
    pub mmsi: Option<Mmsi>,
    pub position: LatLon,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "lowercase")]
pub enum PanelView {
    Text(String),
    Html(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayView {
    pub center: LatLon,
    pub zoom: u8,
    #[serde(serialize_with = "markers_as_list")]
    pub markers: BTreeMap<MarkerHandle, MarkerView>,
    pub placed_total: u64,
    pub status: String,
    pub subtitle: String,
    pub last_updated: String,
    pub panel: PanelView,
    #[serde(with = "time::serde::rfc3339")]
    pub changed_at: OffsetDateTime,
}

fn markers_as_list<S: Serializer>(
    markers: &BTreeMap<MarkerHandle, MarkerView>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(markers.values())
}

impl DisplayView {
    pub fn new(center: LatLon, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            markers: BTreeMap::new(),
            placed_total: 0,
            status: String::new(),
            subtitle: "—".into(),
            last_updated: String::new(),
            panel: PanelView::Text(PLACEHOLDER_TEXT.into()),
            changed_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn shared(center: LatLon, zoom: u8) -> Shared<Self> {
        new_state(Self::new(center, zoom))
    }

    /// Marker currently answering clicks for `mmsi`.
    pub fn marker_for(&self, mmsi: &Mmsi) -> Option<&MarkerView> {
        self.markers.values().find(|m| m.mmsi.as_ref() == Some(mmsi))
    }

    pub fn selected_markers(&self) -> impl Iterator<Item = &MarkerView> {
        self.markers.values().filter(|m| m.selected)
    }

    fn touch(&mut self) {
        self.changed_at = OffsetDateTime::now_utc();
    }
}

#[derive(Clone)]
pub struct HeadlessMap {
    view: Shared<DisplayView>,
    next_id: u64,
}

impl HeadlessMap {
    pub fn new(view: Shared<DisplayView>) -> Self {
        Self { view, next_id: 0 }
    }
}

impl MapSurface for HeadlessMap {
    fn place_marker(&mut self, at: LatLon, style: &MarkerStyle) -> MarkerHandle {
        self.next_id += 1;
        let handle = MarkerHandle::new(self.next_id);
        let mut view = self.view.lock();
        view.markers.insert(
            handle,
            MarkerView { handle, mmsi: None, position: at, label: style.label.clone(), selected: false },
        );
        view.placed_total += 1;
        view.touch();
        handle
    }

    fn move_marker(&mut self, handle: MarkerHandle, to: LatLon) {
        let mut view = self.view.lock();
        if let Some(marker) = view.markers.get_mut(&handle) {
            marker.position = to;
            view.touch();
        }
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        let mut view = self.view.lock();
        if view.markers.remove(&handle).is_some() {
            view.touch();
        }
    }

    fn attach_click(&mut self, handle: MarkerHandle, mmsi: Mmsi) {
        if let Some(marker) = self.view.lock().markers.get_mut(&handle) {
            marker.mmsi = Some(mmsi);
        }
    }

    fn set_selected_style(&mut self, handle: MarkerHandle, selected: bool) -> bool {
        let mut view = self.view.lock();
        let Some(marker) = view.markers.get_mut(&handle) else {
            return false;
        };
        if marker.selected != selected {
            marker.selected = selected;
            view.touch();
        }
        true
    }
}

#[derive(Clone)]
pub struct HeadlessUi {
    view: Shared<DisplayView>,
}

impl HeadlessUi {
    pub fn new(view: Shared<DisplayView>) -> Self {
        Self { view }
    }

    fn write(&self, apply: impl FnOnce(&mut DisplayView)) {
        let mut view = self.view.lock();
        apply(&mut view);
        view.touch();
    }
}

impl UiSinks for HeadlessUi {
    fn set_status(&mut self, text: &str) {
        self.write(|v| v.status = text.to_string());
    }

    fn set_subtitle(&mut self, text: &str) {
        self.write(|v| v.subtitle = text.to_string());
    }

    fn set_last_updated(&mut self, text: &str) {
        self.write(|v| v.last_updated = text.to_string());
    }

    fn set_panel_html(&mut self, html: &str) {
        self.write(|v| v.panel = PanelView::Html(html.to_string()));
    }

    fn set_panel_text(&mut self, text: &str) {
        self.write(|v| v.panel = PanelView::Text(text.to_string()));
    }
}
