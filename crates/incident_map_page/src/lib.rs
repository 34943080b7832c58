//! Static Leaflet map page generation from placed incident markers.

use incident_map::{Coordinate, MapSurface, MarkerStyle, Popup};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Viewport, tile and link configuration for the generated page. Defaults
/// match the service's deployment: viewport restricted to the India region,
/// OpenStreetMap tiles, uploads and status lookup served by the backend.
#[derive(Clone, Debug)]
pub struct PageConfig {
    pub title: String,
    /// Initial map center, (latitude, longitude).
    pub center: (f64, f64),
    pub zoom: u8,
    pub min_zoom: u8,
    /// Hard viewport bounds, ((south, west), (north, east)).
    pub max_bounds: ((f64, f64), (f64, f64)),
    pub max_bounds_viscosity: f64,
    pub tile_url: String,
    pub tile_attribution: String,
    /// Base path images in popups are resolved against.
    pub uploads_base: String,
    /// Destination of the status-lookup link in every popup.
    pub status_page: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Incident Map".to_string(),
            center: (20.5937, 78.9629),
            zoom: 5,
            min_zoom: 4,
            max_bounds: ((5.0, 65.0), (40.0, 100.0)),
            max_bounds_viscosity: 1.0,
            tile_url: OSM_TILE_URL.to_string(),
            tile_attribution: OSM_ATTRIBUTION.to_string(),
            uploads_base: "/static/uploads".to_string(),
            status_page: "/status".to_string(),
        }
    }
}

/// One marker as placed by the renderer. Serialized into the page's
/// inspection snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct PlacedMarker {
    pub at: Coordinate,
    pub style: MarkerStyle,
    pub popup: Popup,
}

/// A map surface that accumulates placed markers and renders them into a
/// self-contained HTML page. Popup payloads are bound to their marker at
/// placement time; the browser materializes them on click, one independent
/// open/closed state per marker.
pub struct LeafletPage {
    config: PageConfig,
    markers: Vec<PlacedMarker>,
}

impl MapSurface for LeafletPage {
    fn place_marker(&mut self, at: Coordinate, style: MarkerStyle, popup: Popup) {
        self.markers.push(PlacedMarker { at, style, popup });
    }
}

impl LeafletPage {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            markers: Vec::new(),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Render the page to `out_path`.
    pub fn render_page(&self, out_path: impl AsRef<Path>) -> Result<(), PageError> {
        let html = self.build_html()?;
        let mut f = std::fs::File::create(out_path.as_ref()).map_err(PageError::Io)?;
        f.write_all(html.as_bytes()).map_err(PageError::Io)?;
        Ok(())
    }

    /// Build the page HTML (for testing or in-memory use). Embeds the placed
    /// marker list as JSON for inspection.
    pub fn build_html(&self) -> Result<String, PageError> {
        let cfg = &self.config;
        let generated = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        let mut marker_js = String::new();
        for marker in &self.markers {
            let color = marker.style.color.css_name();
            marker_js.push_str(&format!(
                "L.circleMarker([{lat}, {lon}], {{ color: {color:?}, fillColor: {color:?}, \
                 fillOpacity: {opacity}, radius: {radius} }}).addTo(map).bindPopup({popup});\n",
                lat = marker.at.latitude,
                lon = marker.at.longitude,
                opacity = marker.style.fill_opacity,
                radius = marker.style.radius,
                popup = js_string(&self.popup_html(&marker.popup))?,
            ));
        }

        let snapshot = script_safe(&serde_json::to_string(&self.markers).map_err(PageError::Json)?);

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8"/>
<meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{title}</title>
<link rel="stylesheet" href="{leaflet_css}"/>
<style>
html, body {{ margin: 0; height: 100%; }}
#map {{ height: calc(100% - 2rem); }}
.footer {{ height: 2rem; line-height: 2rem; padding: 0 0.75rem; font-family: system-ui, sans-serif; font-size: 0.8rem; color: #57606a; }}
</style>
</head>
<body>
<div id="map"></div>
<div class="footer">Generated: {generated} &middot; {count} marker(s)</div>
<script src="{leaflet_js}"></script>
<script>
var map = L.map('map', {{
    maxBounds: [[{s}, {w}], [{n}, {e}]],
    maxBoundsViscosity: {viscosity},
    minZoom: {min_zoom}
}}).setView([{center_lat}, {center_lon}], {zoom});

L.tileLayer({tile_url}, {{
    attribution: {attribution}
}}).addTo(map);

{marker_js}</script>
<script type="application/json" id="marker-snapshot">{snapshot}</script>
</body>
</html>"#,
            title = escape_html(&cfg.title),
            leaflet_css = LEAFLET_CSS,
            leaflet_js = LEAFLET_JS,
            generated = escape_html(&generated),
            count = self.markers.len(),
            s = cfg.max_bounds.0 .0,
            w = cfg.max_bounds.0 .1,
            n = cfg.max_bounds.1 .0,
            e = cfg.max_bounds.1 .1,
            viscosity = cfg.max_bounds_viscosity,
            min_zoom = cfg.min_zoom,
            center_lat = cfg.center.0,
            center_lon = cfg.center.1,
            zoom = cfg.zoom,
            tile_url = js_string(&cfg.tile_url)?,
            attribution = js_string(&cfg.tile_attribution)?,
            marker_js = marker_js,
            snapshot = snapshot,
        );
        Ok(html)
    }

    /// Popup markup for one marker: emphasized status, description, image
    /// embed at fixed width, status-lookup link carrying the report id.
    /// Absent fields render as empty content; a missing image path omits the
    /// embed entirely.
    fn popup_html(&self, popup: &Popup) -> String {
        let image = if popup.image_path.is_empty() {
            String::new()
        } else {
            format!(
                r#"<img src="{base}/{path}" width="100px"><br>"#,
                base = self.config.uploads_base.trim_end_matches('/'),
                path = urlencoding::encode(&popup.image_path),
            )
        };
        format!(
            "<b>Status: {status}</b><br>{description}<br>{image}<a href=\"{link}\">Check Status ID: {id}</a>",
            status = escape_html(&popup.status),
            description = escape_html(&popup.description),
            image = image,
            link = escape_html(&self.config.status_page),
            id = escape_html(&popup.report_id),
        )
    }
}

/// Serialize to a JS string literal safe for inline `<script>` content.
fn js_string(s: &str) -> Result<String, PageError> {
    Ok(script_safe(
        &serde_json::to_string(s).map_err(PageError::Json)?,
    ))
}

/// `<` would let `</script>` in report content terminate the element.
fn script_safe(s: &str) -> String {
    s.replace('<', "\\u003c")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug)]
pub enum PageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::Io(e) => write!(f, "io: {}", e),
            PageError::Json(e) => write!(f, "json: {}", e),
        }
    }
}

impl std::error::Error for PageError {}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map::{render_all, Popup, Report};

    fn sample_reports() -> Vec<Report> {
        vec![
            Report {
                id: "r1".to_string(),
                latitude: Some(0.0),
                longitude: Some(0.0),
                severity: Some("High".to_string()),
                ..Report::default()
            },
            Report {
                id: "r2".to_string(),
                latitude: Some(19.07),
                longitude: Some(72.87),
                severity: Some("Medium".to_string()),
                status: Some("Open".to_string()),
                description: Some("pothole".to_string()),
                image_path: Some("a.png".to_string()),
                ..Report::default()
            },
        ]
    }

    #[test]
    fn surface_accumulates_only_renderable_reports() {
        let mut page = LeafletPage::new(PageConfig::default());
        assert_eq!(render_all(&sample_reports(), &mut page), 1);
        assert_eq!(page.marker_count(), 1);
    }

    #[test]
    fn page_contains_viewport_and_tiles() {
        let page = LeafletPage::new(PageConfig::default());
        let html = page.build_html().unwrap();
        assert!(html.contains("maxBounds: [[5, 65], [40, 100]]"));
        assert!(html.contains("setView([20.5937, 78.9629], 5)"));
        assert!(html.contains("minZoom: 4"));
        assert!(html.contains("tile.openstreetmap.org"));
        assert!(html.contains("0 marker(s)"));
    }

    #[test]
    fn marker_emitted_with_resolved_style_and_popup() {
        let mut page = LeafletPage::new(PageConfig::default());
        render_all(&sample_reports(), &mut page);
        let html = page.build_html().unwrap();
        assert!(html.contains("L.circleMarker([19.07, 72.87]"));
        assert!(html.contains(r#"color: "orange", fillColor: "orange", fillOpacity: 0.5, radius: 10"#));
        assert!(html.contains("Status: Open"));
        assert!(html.contains("pothole"));
        assert!(html.contains("/static/uploads/a.png"));
        assert!(html.contains("Check Status ID: r2"));
        assert!(html.contains(r#"href=\"/status\""#));
    }

    #[test]
    fn popup_markup_fixed_order() {
        let page = LeafletPage::new(PageConfig::default());
        let popup = Popup {
            status: "Open".to_string(),
            description: "pothole".to_string(),
            image_path: "a.png".to_string(),
            report_id: "r2".to_string(),
        };
        assert_eq!(
            page.popup_html(&popup),
            "<b>Status: Open</b><br>pothole<br>\
             <img src=\"/static/uploads/a.png\" width=\"100px\"><br>\
             <a href=\"/status\">Check Status ID: r2</a>"
        );
    }

    #[test]
    fn missing_fields_render_as_empty_content() {
        let page = LeafletPage::new(PageConfig::default());
        let popup = Popup {
            status: String::new(),
            description: String::new(),
            image_path: String::new(),
            report_id: "bare".to_string(),
        };
        // No image embed at all when the report had no image path.
        assert_eq!(
            page.popup_html(&popup),
            "<b>Status: </b><br><br><a href=\"/status\">Check Status ID: bare</a>"
        );
    }

    #[test]
    fn report_content_cannot_break_out_of_script() {
        let mut page = LeafletPage::new(PageConfig::default());
        let report = Report {
            id: "evil".to_string(),
            latitude: Some(21.0),
            longitude: Some(79.0),
            description: Some("</script><script>alert(1)</script>".to_string()),
            ..Report::default()
        };
        render_all(&[report], &mut page);
        let html = page.build_html().unwrap();
        assert!(!html.contains("</script><script>alert(1)"));
    }

    #[test]
    fn duplicate_render_duplicates_markers_in_page() {
        let mut page = LeafletPage::new(PageConfig::default());
        render_all(&sample_reports(), &mut page);
        render_all(&sample_reports(), &mut page);
        assert_eq!(page.marker_count(), 2);
        let html = page.build_html().unwrap();
        assert_eq!(html.matches("L.circleMarker(").count(), 2);
    }

    #[test]
    fn render_page_writes_file() {
        let mut page = LeafletPage::new(PageConfig::default());
        render_all(&sample_reports(), &mut page);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");
        page.render_page(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, page.build_html().unwrap());
    }

    #[test]
    fn snapshot_embed_present() {
        let mut page = LeafletPage::new(PageConfig::default());
        render_all(&sample_reports(), &mut page);
        let html = page.build_html().unwrap();
        assert!(html.contains(r#"id="marker-snapshot""#));
        assert!(html.contains(r#""report_id":"r2""#));
    }
}
