/*!
Builders for feed snapshots and vessel records

Defaults mirror the collector's dev sample (Duluth harbor, cargo vessels,
current UTC timestamps) so tests only spell out what they care about.
*/

use harborframe_display::{Mmsi, VesselRecord, VesselSnapshot};
use serde_json::Value;

pub struct VesselBuilder {
    record: VesselRecord,
}

impl VesselBuilder {
    pub fn new<S: Into<String>>(mmsi: S) -> Self {
        let mmsi = mmsi.into();
        Self {
            record: VesselRecord {
                name: Some(format!("VESSEL {}", mmsi)),
                mmsi: Mmsi::new(mmsi),
                vessel_type: Some("cargo".to_string()),
                lat: 46.777,
                lon: -92.095,
                sog_knots: 0.0,
                cog_deg: 0.0,
                heading_deg: None,
                last_updated_utc: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.record.lat = lat;
        self.record.lon = lon;
        self
    }

    pub fn speed(mut self, knots: f64) -> Self {
        self.record.sog_knots = knots;
        self
    }

    pub fn course(mut self, degrees: f64) -> Self {
        self.record.cog_deg = degrees;
        self
    }

    pub fn heading(mut self, degrees: f64) -> Self {
        self.record.heading_deg = Some(degrees);
        self
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.record.name = Some(name.into());
        self
    }

    pub fn vessel_type<S: Into<String>>(mut self, vessel_type: S) -> Self {
        self.record.vessel_type = Some(vessel_type.into());
        self
    }

    pub fn untyped(mut self) -> Self {
        self.record.vessel_type = None;
        self
    }

    pub fn build(self) -> VesselRecord {
        self.record
    }
}

pub struct SnapshotBuilder {
    snapshot: VesselSnapshot,
}

impl SnapshotBuilder {
    pub fn new<S: Into<String>>(area_name: S) -> Self {
        Self {
            snapshot: VesselSnapshot {
                area_name: area_name.into(),
                bbox: None,
                generated_at_utc: chrono::Utc::now().to_rfc3339(),
                vessels: Vec::new(),
            },
        }
    }

    pub fn generated_at<S: Into<String>>(mut self, at: S) -> Self {
        self.snapshot.generated_at_utc = at.into();
        self
    }

    pub fn vessel(mut self, vessel: VesselBuilder) -> Self {
        self.snapshot.vessels.push(vessel.build());
        self
    }

    pub fn build(self) -> VesselSnapshot {
        self.snapshot
    }

    /// Wire form, as the collector would serve it.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.snapshot).unwrap_or(Value::Null)
    }
}
