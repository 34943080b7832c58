//! Marker rendering pipeline: filter, classify, place, bind popup.

use crate::report::{MarkerColor, Report, Severity};
use serde::Serialize;
use tracing::{debug, info};

/// Marker radius in display units. Constant for every marker; size does not
/// encode severity.
pub const MARKER_RADIUS: u32 = 10;
/// Marker fill opacity. Constant for every marker.
pub const MARKER_FILL_OPACITY: f64 = 0.5;

/// Geographic point, WGS84 degrees. Not range-checked: out-of-range values
/// pass through and may place markers outside the visible map bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Visual style of one marker. The color is applied to both stroke and fill.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub color: MarkerColor,
    pub fill_opacity: f64,
    pub radius: u32,
}

impl MarkerStyle {
    /// Resolve the style for a severity grade. Total: unknown grades get the
    /// default (blue) style rather than failing.
    pub fn for_severity(severity: Severity) -> Self {
        Self {
            color: severity.color(),
            fill_opacity: MARKER_FILL_OPACITY,
            radius: MARKER_RADIUS,
        }
    }
}

/// Display fields bound to a marker when it is placed. The popup payload is
/// carried with the marker and materialized only on user interaction, so it
/// never re-derives content from external state at click time. Absent source
/// fields are carried as empty text, not errors.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Popup {
    pub status: String,
    pub description: String,
    /// Relative image reference; empty when the report had none.
    pub image_path: String,
    /// Report id for the status-lookup link.
    pub report_id: String,
}

impl Popup {
    pub fn from_report(report: &Report) -> Self {
        Self {
            status: report.status.clone().unwrap_or_default(),
            description: report.description.clone().unwrap_or_default(),
            image_path: report.image_path.clone().unwrap_or_default(),
            report_id: report.id.clone(),
        }
    }
}

/// Surface markers are placed onto. Implementations own viewport, bounds and
/// tile concerns; the renderer only places styled markers and binds popups.
/// Each marker's popup keeps its own open/closed state, independent of every
/// other marker.
pub trait MapSurface {
    fn place_marker(&mut self, at: Coordinate, style: MarkerStyle, popup: Popup);
}

/// Place one styled, popup-bearing marker per renderable report onto
/// `surface`, in input order. Returns the number of markers placed.
///
/// The sole rejection rule is the `(0, 0)` sentinel coordinate. There is no
/// dedup by id: rendering the same input twice onto one surface places
/// duplicate markers, and a caller wanting refresh-without-duplication must
/// clear the surface first.
pub fn render_all<S: MapSurface>(reports: &[Report], surface: &mut S) -> usize {
    let mut placed = 0;
    for report in reports {
        if !report.has_location() {
            debug!(id = %report.id, "skipping report without captured location");
            continue;
        }
        let (latitude, longitude) = report.coordinate();
        let style = MarkerStyle::for_severity(Severity::classify(report.severity.as_deref()));
        surface.place_marker(
            Coordinate {
                latitude,
                longitude,
            },
            style,
            Popup::from_report(report),
        );
        placed += 1;
    }
    info!(total = reports.len(), placed, "render pass complete");
    placed
}
