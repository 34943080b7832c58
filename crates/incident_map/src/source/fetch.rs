//! Report feed client. One GET per render cycle; no retry, no cache.

use crate::report::Report;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const REPORTS_PATH: &str = "/api/reports";

#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    /// Feed unreachable or refused: connection failure or HTTP error status.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// Response body is not a well-formed report array.
    #[error("format: {0}")]
    Format(#[from] serde_json::Error),
    /// Configured base URL does not parse. Raised at construction, before
    /// any fetch.
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Client for the report feed. A failure is terminal for the render cycle;
/// the caller decides whether to start a fresh one.
#[derive(Debug)]
pub struct ReportSource {
    endpoint: Url,
    client: reqwest::Client,
}

impl ReportSource {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let base = Url::parse(&config.base_url)?;
        let endpoint = base.join(REPORTS_PATH)?;
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self { endpoint, client })
    }

    /// Fetch the full current report list. Single suspending operation: no
    /// pagination, no streaming, no retry.
    pub async fn fetch_reports(&self) -> Result<Vec<Report>, SourceError> {
        debug!(endpoint = %self.endpoint, "fetching report feed");
        let body = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let reports = parse_reports(&body)?;
        info!(count = reports.len(), "report feed fetched");
        Ok(reports)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Parse a feed body as a report array. Field-level anomalies are absorbed
/// by the record model; only a body that is not a report array fails.
pub fn parse_reports(body: &str) -> Result<Vec<Report>, SourceError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joined_from_base() {
        let source = ReportSource::new(SourceConfig {
            base_url: "http://example.test:8080".to_string(),
        })
        .unwrap();
        assert_eq!(source.endpoint().as_str(), "http://example.test:8080/api/reports");
    }

    #[test]
    fn bad_base_url_rejected() {
        let err = ReportSource::new(SourceConfig {
            base_url: "not a url".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, SourceError::BaseUrl(_)));
    }

    #[test]
    fn parse_report_array() {
        let body = r#"[
            {"id": "r1", "latitude": 19.07, "longitude": 72.87, "severity": "High",
             "status": "Pending", "description": "pothole", "image_path": "r1_a.png"},
            {"id": "r2"}
        ]"#;
        let reports = parse_reports(body).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, "r1");
        assert_eq!(reports[1].coordinate(), (0.0, 0.0));
    }

    #[test]
    fn parse_empty_array() {
        assert!(parse_reports("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_non_array() {
        let err = parse_reports(r#"{"error": "nope"}"#).unwrap_err();
        assert!(matches!(err, SourceError::Format(_)));
        assert!(parse_reports("not json").is_err());
    }
}
