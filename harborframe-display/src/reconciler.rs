//! Marker reconciler
//!
//! Owns the marker map (`mmsi -> marker handle`) and the selection, and
//! converges the map surface onto each new snapshot with the smallest set of
//! place/move/remove calls. Reconciliation is synchronous: once a snapshot is
//! in hand nothing else (clicks included) can run until it returns.

use crate::map::{MapSurface, MarkerHandle, MarkerStyle};
use crate::models::{LatLon, Mmsi, VesselRecord, VesselSnapshot};
use crate::panel::{format_vessel, UiSinks, PLACEHOLDER_TEXT};
use std::collections::BTreeMap;
use tracing::debug;

/// A marker this reconciler created on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    pub handle: MarkerHandle,
    pub position: LatLon,
    pub style: MarkerStyle,
}

/// What one `reconcile` call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub moved: usize,
    pub removed: usize,
    pub selection_evicted: bool,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.moved == 0 && self.removed == 0 && !self.selection_evicted
    }
}

/// Marker and selection state, created once by the poll loop and kept for
/// the lifetime of the process.
#[derive(Debug, Default)]
pub struct Reconciler {
    markers: BTreeMap<Mmsi, MarkerEntry>,
    selected: Option<Mmsi>,
    // Latest record per key, so clicks always render live data.
    latest: BTreeMap<Mmsi, VesselRecord>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile<M, U>(&mut self, snapshot: &VesselSnapshot, map: &mut M, ui: &mut U) -> ReconcileReport
    where
        M: MapSurface,
        U: UiSinks,
    {
        let latest = snapshot.latest_by_key();
        let mut report = ReconcileReport::default();

        // Snapshot order is paint order. A repeated key is acted on once, at
        // its last occurrence.
        for vessel in &snapshot.vessels {
            if !latest.get(&vessel.mmsi).is_some_and(|last| std::ptr::eq(*last, vessel)) {
                continue;
            }
            let at = vessel.position();
            match self.markers.get_mut(&vessel.mmsi) {
                Some(entry) => {
                    if entry.position != at {
                        map.move_marker(entry.handle, at);
                        entry.position = at;
                        report.moved += 1;
                    }
                }
                None => {
                    let style = MarkerStyle::for_vessel_type(vessel.vessel_type());
                    let handle = map.place_marker(at, &style);
                    map.attach_click(handle, vessel.mmsi.clone());
                    self.markers.insert(vessel.mmsi.clone(), MarkerEntry { handle, position: at, style });
                    report.created += 1;
                }
            }
        }

        let stale: Vec<Mmsi> = self
            .markers
            .keys()
            .filter(|key| !latest.contains_key(*key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(entry) = self.markers.remove(&key) {
                map.remove_marker(entry.handle);
                report.removed += 1;
            }
            if self.selected.as_ref() == Some(&key) {
                self.selected = None;
                ui.set_panel_text(PLACEHOLDER_TEXT);
                report.selection_evicted = true;
            }
        }

        self.latest = latest
            .into_iter()
            .map(|(key, vessel)| (key, vessel.clone()))
            .collect();

        // Styling is independent of position, so reapply it even for markers
        // the loop above already touched.
        if let Some(selected) = &self.selected {
            if let Some(vessel) = self.latest.get(selected) {
                ui.set_panel_html(&format_vessel(vessel));
                self.apply_selection_styles(map);
            }
        }

        debug!(
            created = report.created,
            moved = report.moved,
            removed = report.removed,
            markers = self.markers.len(),
            "reconciled snapshot"
        );
        report
    }

    /// Handle a marker click. Replaces any previous selection and repaints
    /// the panel from the latest record. Clicks for keys without a live
    /// marker are ignored and return `false`.
    pub fn select<M, U>(&mut self, mmsi: &Mmsi, map: &mut M, ui: &mut U) -> bool
    where
        M: MapSurface,
        U: UiSinks,
    {
        if !self.markers.contains_key(mmsi) {
            debug!(%mmsi, "click ignored, no live marker");
            return false;
        }
        let Some(vessel) = self.latest.get(mmsi) else {
            return false;
        };
        ui.set_panel_html(&format_vessel(vessel));
        self.selected = Some(mmsi.clone());
        self.apply_selection_styles(map);
        true
    }

    fn apply_selection_styles<M: MapSurface>(&self, map: &mut M) {
        for (key, entry) in &self.markers {
            let selected = self.selected.as_ref() == Some(key);
            if !map.set_selected_style(entry.handle, selected) {
                debug!(mmsi = %key, "marker not rendered yet, style skipped");
            }
        }
    }

    pub fn selected(&self) -> Option<&Mmsi> {
        self.selected.as_ref()
    }

    pub fn latest_record(&self, mmsi: &Mmsi) -> Option<&VesselRecord> {
        self.latest.get(mmsi)
    }

    pub fn marker_keys(&self) -> impl Iterator<Item = &Mmsi> {
        self.markers.keys()
    }

    pub fn marker(&self, mmsi: &Mmsi) -> Option<&MarkerEntry> {
        self.markers.get(mmsi)
    }

    pub fn marker_handle(&self, mmsi: &Mmsi) -> Option<MarkerHandle> {
        self.markers.get(mmsi).map(|entry| entry.handle)
    }

    pub fn marker_position(&self, mmsi: &Mmsi) -> Option<LatLon> {
        self.markers.get(mmsi).map(|entry| entry.position)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    #[derive(Default)]
    struct FakeMap {
        next_id: u64,
        live: HashMap<MarkerHandle, (LatLon, bool)>,
        clicks: HashMap<MarkerHandle, Mmsi>,
        placed: usize,
        moves: usize,
        placed_at: Vec<LatLon>,
    }

    impl MapSurface for FakeMap {
        fn place_marker(&mut self, at: LatLon, _style: &MarkerStyle) -> MarkerHandle {
            self.next_id += 1;
            self.placed += 1;
            self.placed_at.push(at);
            let handle = MarkerHandle::new(self.next_id);
            self.live.insert(handle, (at, false));
            handle
        }

        fn move_marker(&mut self, handle: MarkerHandle, to: LatLon) {
            self.moves += 1;
            self.live.get_mut(&handle).expect("move on dead handle").0 = to;
        }

        fn remove_marker(&mut self, handle: MarkerHandle) {
            self.live.remove(&handle).expect("double remove");
            self.clicks.remove(&handle);
        }

        fn attach_click(&mut self, handle: MarkerHandle, mmsi: Mmsi) {
            self.clicks.insert(handle, mmsi);
        }

        fn set_selected_style(&mut self, handle: MarkerHandle, selected: bool) -> bool {
            match self.live.get_mut(&handle) {
                Some(marker) => {
                    marker.1 = selected;
                    true
                }
                None => false,
            }
        }
    }

    #[derive(Default)]
    struct FakeUi {
        panel: String,
    }

    impl UiSinks for FakeUi {
        fn set_status(&mut self, _text: &str) {}
        fn set_subtitle(&mut self, _text: &str) {}
        fn set_last_updated(&mut self, _text: &str) {}
        fn set_panel_html(&mut self, html: &str) {
            self.panel = html.to_string();
        }
        fn set_panel_text(&mut self, text: &str) {
            self.panel = text.to_string();
        }
    }

    fn vessel(mmsi: &str, lat: f64, lon: f64, sog: f64) -> VesselRecord {
        VesselRecord {
            mmsi: Mmsi::from(mmsi),
            name: Some(format!("VESSEL {mmsi}")),
            vessel_type: Some("cargo".into()),
            lat,
            lon,
            sog_knots: sog,
            cog_deg: 180.0,
            heading_deg: None,
            last_updated_utc: "2026-10-14T12:00:00Z".into(),
        }
    }

    fn snapshot(vessels: Vec<VesselRecord>) -> VesselSnapshot {
        VesselSnapshot {
            area_name: "Duluth".into(),
            bbox: None,
            generated_at_utc: "2026-10-14T12:00:00Z".into(),
            vessels,
        }
    }

    fn keys(reconciler: &Reconciler) -> BTreeSet<&str> {
        reconciler.marker_keys().map(Mmsi::as_str).collect()
    }

    #[test]
    fn test_first_sighting_creates_marker() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        let report = rec.reconcile(&snapshot(vec![vessel("1", 46.78, -92.10, 5.2)]), &mut map, &mut ui);

        assert_eq!(report.created, 1);
        assert_eq!(rec.marker_position(&"1".into()), Some(LatLon::new(46.78, -92.10)));
        let handle = rec.marker_handle(&"1".into()).unwrap();
        assert_eq!(map.live[&handle].0, LatLon::new(46.78, -92.10));
        assert_eq!(map.clicks[&handle], Mmsi::from("1"));
        assert_eq!(rec.marker(&"1".into()).unwrap().style.label, "C");
    }

    #[test]
    fn test_add_move_remove_keeps_identity() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        rec.reconcile(&snapshot(vec![vessel("1", 1.0, 1.0, 0.0), vessel("2", 2.0, 2.0, 0.0)]), &mut map, &mut ui);
        let handle_two = rec.marker_handle(&"2".into()).unwrap();

        let report = rec.reconcile(&snapshot(vec![vessel("2", 2.5, 2.5, 0.0), vessel("3", 3.0, 3.0, 0.0)]), &mut map, &mut ui);

        assert_eq!(report, ReconcileReport { created: 1, moved: 1, removed: 1, selection_evicted: false });
        assert_eq!(keys(&rec), BTreeSet::from(["2", "3"]));
        assert_eq!(rec.marker_handle(&"2".into()), Some(handle_two));
        assert_eq!(map.live[&handle_two].0, LatLon::new(2.5, 2.5));
        assert_eq!(map.live.len(), 2);
    }

    #[test]
    fn test_same_snapshot_twice_is_noop() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        let snap = snapshot(vec![vessel("1", 1.0, 1.0, 0.0), vessel("2", 2.0, 2.0, 0.0)]);
        rec.reconcile(&snap, &mut map, &mut ui);
        let report = rec.reconcile(&snap, &mut map, &mut ui);

        assert!(report.is_noop());
        assert_eq!(map.placed, 2);
        assert_eq!(keys(&rec), BTreeSet::from(["1", "2"]));
    }

    #[test]
    fn test_duplicate_key_last_occurrence_is_authoritative() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        let snap = snapshot(vec![vessel("9", 1.0, 1.0, 1.0), vessel("9", 4.0, 4.0, 7.0)]);

        let first = rec.reconcile(&snap, &mut map, &mut ui);
        assert_eq!(first, ReconcileReport { created: 1, moved: 0, removed: 0, selection_evicted: false });
        assert_eq!(map.placed_at, vec![LatLon::new(4.0, 4.0)]);
        assert_eq!(map.moves, 0);
        assert_eq!(rec.marker_position(&"9".into()), Some(LatLon::new(4.0, 4.0)));
        assert_eq!(rec.latest_record(&"9".into()).unwrap().sog_knots, 7.0);

        let second = rec.reconcile(&snap, &mut map, &mut ui);
        assert!(second.is_noop());
        assert_eq!(map.placed, 1);
        assert_eq!(map.moves, 0);
    }

    #[test]
    fn test_duplicate_key_style_follows_last_occurrence() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        let mut tug = vessel("9", 4.0, 4.0, 0.0);
        tug.vessel_type = Some("tug".into());

        rec.reconcile(&snapshot(vec![vessel("9", 1.0, 1.0, 0.0), tug]), &mut map, &mut ui);
        assert_eq!(rec.marker(&"9".into()).unwrap().style.label, "T");
    }

    #[test]
    fn test_selection_follows_live_record() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        rec.reconcile(&snapshot(vec![vessel("1", 1.0, 1.0, 1.0), vessel("2", 2.0, 2.0, 5.2)]), &mut map, &mut ui);
        assert!(rec.select(&"2".into(), &mut map, &mut ui));
        assert!(ui.panel.contains("Speed: 5.2 kn"));

        rec.reconcile(&snapshot(vec![vessel("1", 1.0, 1.0, 1.0), vessel("2", 2.1, 2.0, 8.7)]), &mut map, &mut ui);

        assert_eq!(rec.selected(), Some(&Mmsi::from("2")));
        assert!(ui.panel.contains("Speed: 8.7 kn"));
        let two = rec.marker_handle(&"2".into()).unwrap();
        let one = rec.marker_handle(&"1".into()).unwrap();
        assert!(map.live[&two].1);
        assert!(!map.live[&one].1);
    }

    #[test]
    fn test_selected_vessel_leaving_clears_panel() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        rec.reconcile(&snapshot(vec![vessel("1", 1.0, 1.0, 1.0), vessel("2", 2.0, 2.0, 2.0)]), &mut map, &mut ui);
        rec.select(&"1".into(), &mut map, &mut ui);

        let report = rec.reconcile(&snapshot(vec![vessel("2", 2.0, 2.0, 2.0)]), &mut map, &mut ui);

        assert!(report.selection_evicted);
        assert_eq!(rec.selected(), None);
        assert_eq!(ui.panel, PLACEHOLDER_TEXT);
    }

    #[test]
    fn test_select_replaces_previous_selection() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        rec.reconcile(&snapshot(vec![vessel("1", 1.0, 1.0, 1.0), vessel("2", 2.0, 2.0, 2.0)]), &mut map, &mut ui);
        rec.select(&"1".into(), &mut map, &mut ui);
        rec.select(&"2".into(), &mut map, &mut ui);
        rec.select(&"2".into(), &mut map, &mut ui);

        assert_eq!(rec.selected(), Some(&Mmsi::from("2")));
        let selected: Vec<bool> = ["1", "2"]
            .iter()
            .map(|k| map.live[&rec.marker_handle(&Mmsi::from(*k)).unwrap()].1)
            .collect();
        assert_eq!(selected, vec![false, true]);
        assert!(ui.panel.contains("VESSEL 2"));
    }

    #[test]
    fn test_click_on_unknown_key_is_ignored() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        rec.reconcile(&snapshot(vec![vessel("1", 1.0, 1.0, 1.0)]), &mut map, &mut ui);
        rec.select(&"1".into(), &mut map, &mut ui);
        let before = ui.panel.clone();

        assert!(!rec.select(&"404".into(), &mut map, &mut ui));
        assert_eq!(rec.selected(), Some(&Mmsi::from("1")));
        assert_eq!(ui.panel, before);
    }

    #[test]
    fn test_empty_snapshot_removes_everything() {
        let (mut map, mut ui, mut rec) = (FakeMap::default(), FakeUi::default(), Reconciler::new());
        rec.reconcile(&snapshot(vec![vessel("1", 1.0, 1.0, 1.0), vessel("2", 2.0, 2.0, 2.0)]), &mut map, &mut ui);
        let report = rec.reconcile(&snapshot(Vec::new()), &mut map, &mut ui);

        assert_eq!(report.removed, 2);
        assert!(rec.is_empty());
        assert!(map.live.is_empty());
        assert!(map.clicks.is_empty());
    }
}
