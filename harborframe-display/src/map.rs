//! Map surface collaborator
//!
//! The reconciler never talks to a mapping library directly: it drives a
//! `MapSurface` through handles the surface issued. Click callbacks are
//! expressed as `MarkerClick` events carrying only the vessel key, the
//! handler resolves the live record when the event is serviced.

use crate::models::{LatLon, Mmsi};
use serde::Serialize;

/// Reference to a marker object owned by the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Pin styling token derived from the vessel type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub label: String,
}

impl MarkerStyle {
    pub const UNKNOWN_LABEL: &'static str = "?";

    /// First character of the type, uppercased. `"?"` when absent or empty.
    pub fn for_vessel_type(vessel_type: Option<&str>) -> Self {
        let label = vessel_type
            .and_then(|t| t.chars().next())
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_else(|| Self::UNKNOWN_LABEL.to_string());
        Self { label }
    }
}

/// User click on a marker, as reported by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClick {
    pub mmsi: Mmsi,
}

impl MarkerClick {
    pub fn new<M: Into<Mmsi>>(mmsi: M) -> Self {
        Self { mmsi: mmsi.into() }
    }
}

pub trait MapSurface {
    /// Place a new marker and return its handle.
    fn place_marker(&mut self, at: LatLon, style: &MarkerStyle) -> MarkerHandle;

    /// Move an existing marker in place.
    fn move_marker(&mut self, handle: MarkerHandle, to: LatLon);

    /// Release a marker from the surface. The handle is dead afterwards.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Route clicks on `handle` back as `MarkerClick { mmsi }`.
    fn attach_click(&mut self, handle: MarkerHandle, mmsi: Mmsi);

    /// Toggle the "selected" decoration on the rendered pin. Returns `false`
    /// when the marker has no rendered element yet.
    fn set_selected_style(&mut self, handle: MarkerHandle, selected: bool) -> bool;
}
