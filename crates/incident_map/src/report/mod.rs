//! Incident report records as served by the report feed.

use serde::{Deserialize, Deserializer, Serialize};

/// One incident report from `/api/reports`. Snapshot semantics: fetched once
/// per render cycle, never mutated.
///
/// Every field beyond `id` is optional in practice; the feed carries whatever
/// the backend stored, including rows with no captured location. Those
/// deserialize to `None` coordinates and collapse to the `(0, 0)` sentinel.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Report {
    /// Opaque stable identifier. The feed serves strings; numeric ids are
    /// accepted and carried as their decimal text.
    #[serde(default, deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Free-form severity grade; see [`Severity::classify`].
    #[serde(default)]
    pub severity: Option<String>,
    /// Current handling state, display text.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Relative image reference under the uploads path.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Free-form place label; carried but not used for placement.
    #[serde(default)]
    pub location_name: Option<String>,
}

impl Report {
    /// Coordinate pair with absent/null components normalized to the
    /// `(0, 0)` sentinel.
    pub fn coordinate(&self) -> (f64, f64) {
        (self.latitude.unwrap_or(0.0), self.longitude.unwrap_or(0.0))
    }

    /// Whether this report carries a real location. `(0, 0)` is reserved to
    /// mean "no location captured" and is never a legitimate report location
    /// in the operating region.
    pub fn has_location(&self) -> bool {
        self.coordinate() != (0.0, 0.0)
    }
}

fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Recognized severity grades. Classification is total: any value outside
/// the three recognized grades (absent, null, misspelled, wrong case) is
/// `Other` and renders with the default style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    High,
    Medium,
    Low,
    Other,
}

impl Severity {
    /// Case-sensitive, exact-match classification. `"high"` is `Other`; that
    /// matches the feed contract, not an oversight.
    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            Some("High") => Self::High,
            Some("Medium") => Self::Medium,
            Some("Low") => Self::Low,
            _ => Self::Other,
        }
    }

    /// Marker color for this grade.
    pub fn color(self) -> MarkerColor {
        match self {
            Self::High => MarkerColor::Red,
            Self::Medium => MarkerColor::Orange,
            Self::Low => MarkerColor::Green,
            Self::Other => MarkerColor::Blue,
        }
    }
}

/// Marker palette. Blue is the default for unrecognized severities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MarkerColor {
    Red,
    Orange,
    Green,
    Blue,
}

impl MarkerColor {
    /// CSS color name, used for both marker stroke and fill.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}
