//! Detail panel and header text formatting
//!
//! Everything that ends up in the UI regions is produced here as plain
//! strings or escaped HTML fragments. The sinks are write-only.

use crate::models::{VesselRecord, VesselSnapshot};

pub const PLACEHOLDER_TEXT: &str = "Tap a vessel marker to see details.";
const MISSING: &str = "—";

/// The text regions the core writes into.
pub trait UiSinks {
    fn set_status(&mut self, text: &str);
    fn set_subtitle(&mut self, text: &str);
    fn set_last_updated(&mut self, text: &str);
    fn set_panel_html(&mut self, html: &str);
    fn set_panel_text(&mut self, text: &str);
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// HTML fragment for the detail panel.
pub fn format_vessel(vessel: &VesselRecord) -> String {
    let mut lines = vec![
        format!(
            r#"<div style="font-weight:650; font-size:14px; color: rgba(230,238,248,0.95);">{}</div>"#,
            escape_html(vessel.name().unwrap_or("Unknown"))
        ),
        format!(
            r#"<div style="margin-top:6px;">Type: {}</div>"#,
            escape_html(vessel.vessel_type().unwrap_or("other"))
        ),
        format!("<div>MMSI: {}</div>", escape_html(vessel.mmsi.as_str())),
        format!("<div>Speed: {:.1} kn</div>", vessel.sog_knots),
        format!("<div>Course: {:.0}°</div>", vessel.cog_deg),
    ];
    if let Some(heading) = vessel.heading_deg {
        lines.push(format!("<div>Heading: {:.0}°</div>", heading));
    }
    lines.push(format!("<div>Updated: {}</div>", escape_html(&vessel.last_updated_utc)));
    lines.concat()
}

pub fn subtitle_text(snapshot: &VesselSnapshot) -> &str {
    if snapshot.area_name.is_empty() {
        MISSING
    } else {
        &snapshot.area_name
    }
}

pub fn last_updated_text(snapshot: &VesselSnapshot) -> String {
    let generated = if snapshot.generated_at_utc.is_empty() {
        MISSING
    } else {
        snapshot.generated_at_utc.as_str()
    };
    format!("Generated: {generated}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mmsi;

    fn record() -> VesselRecord {
        VesselRecord {
            mmsi: Mmsi::from("367890120"),
            name: Some("HARBOR TUG <AURORA>".into()),
            vessel_type: Some("tug".into()),
            lat: 46.7728,
            lon: -92.0920,
            sog_knots: 6.14,
            cog_deg: 210.0,
            heading_deg: None,
            last_updated_utc: "2026-10-14T12:00:00+00:00".into(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_format_vessel_escapes_and_rounds() {
        let html = format_vessel(&record());
        assert!(html.contains("HARBOR TUG &lt;AURORA&gt;"));
        assert!(html.contains("Type: tug"));
        assert!(html.contains("MMSI: 367890120"));
        assert!(html.contains("Speed: 6.1 kn"));
        assert!(html.contains("Course: 210°"));
        assert!(!html.contains("Heading"));
        assert!(html.contains("Updated: 2026-10-14T12:00:00+00:00"));
    }

    #[test]
    fn test_format_vessel_fallbacks() {
        let mut vessel = record();
        vessel.name = None;
        vessel.vessel_type = Some(String::new());
        vessel.heading_deg = Some(52.4);
        let html = format_vessel(&vessel);
        assert!(html.contains(">Unknown</div>"));
        assert!(html.contains("Type: other"));
        assert!(html.contains("Heading: 52°"));
    }

    #[test]
    fn test_header_texts() {
        let mut snapshot: VesselSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(subtitle_text(&snapshot), "—");
        assert_eq!(last_updated_text(&snapshot), "Generated: —");

        snapshot.area_name = "Duluth Harbor".into();
        snapshot.generated_at_utc = "2026-10-14T12:00:00Z".into();
        assert_eq!(subtitle_text(&snapshot), "Duluth Harbor");
        assert_eq!(last_updated_text(&snapshot), "Generated: 2026-10-14T12:00:00Z");
    }
}
