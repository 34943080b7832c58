//! incident_map — severity-coded marker rendering for a civic report feed.
//!
//! Fetches incident reports from `/api/reports`, filters out records without
//! a captured location, classifies severity into a marker style, and places
//! one popup-bearing marker per report onto a caller-supplied map surface.
//! Read-only; the feed, tile serving, and report submission live elsewhere.

pub mod render;
pub mod report;
pub mod source;

pub use render::{render_all, Coordinate, MapSurface, MarkerStyle, Popup};
pub use report::{MarkerColor, Report, Severity};
pub use source::{parse_reports, ReportSource, SourceConfig, SourceError};
