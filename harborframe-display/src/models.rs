//! Vessel feed data model
//!
//! Wire types for the `/vessels` document published by the collector.
//! Numeric fields decode leniently: a garbled speed degrades what the panel
//! shows, it never fails the snapshot. The only hard requirement per record
//! is the `mmsi` join key.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Maritime Mobile Service Identity, the join key between snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Mmsi(String);

impl Mmsi {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mmsi {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Mmsi {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Some AIS sources emit the MMSI as a bare number.
impl<'de> Deserialize<'de> for Mmsi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Mmsi(s)),
            Value::Number(n) => Ok(Mmsi(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "mmsi must be a string or a number, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Area covered by the feed, `[min_lon, min_lat, max_lon, max_lat]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Serialize for BoundingBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat].serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselRecord {
    pub mmsi: Mmsi,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub vessel_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lon: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sog_knots: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cog_deg: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub last_updated_utc: String,
}

impl VesselRecord {
    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    /// Vessel name, `None` when absent or empty.
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    /// Vessel type, `None` when absent or empty.
    pub fn vessel_type(&self) -> Option<&str> {
        non_empty(&self.vessel_type)
    }
}

/// One complete fetch of the feed. Superseded wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSnapshot {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub area_name: String,
    #[serde(default, deserialize_with = "lenient_bbox", skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub generated_at_utc: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vessels: Vec<VesselRecord>,
}

impl VesselSnapshot {
    /// Records keyed by mmsi; on duplicates the last occurrence wins.
    pub fn latest_by_key(&self) -> BTreeMap<Mmsi, &VesselRecord> {
        let mut latest = BTreeMap::new();
        for vessel in &self.vessels {
            latest.insert(vessel.mmsi.clone(), vessel);
        }
        latest
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Numeric coercion: numbers, numeric strings and booleans are accepted,
/// anything else (or a non-finite result) is `None`.
fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64).unwrap_or_default())
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<VesselRecord>, D::Error> {
    Ok(Option::<Vec<VesselRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

// A malformed bbox only loses the hint, the vessels are still usable.
fn lenient_bbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BoundingBox>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else { return Ok(None) };
    let coords: Vec<f64> = items.iter().filter_map(coerce_f64).collect();
    match (items.len(), coords.as_slice()) {
        (4, [min_lon, min_lat, max_lon, max_lat]) => Ok(Some(BoundingBox {
            min_lon: *min_lon,
            min_lat: *min_lat,
            max_lon: *max_lon,
            max_lat: *max_lat,
        })),
        _ => Ok(None),
    }
}
