//! Report feed access: HTTP client for the `/api/reports` contract.

mod fetch;

pub use fetch::{parse_reports, ReportSource, SourceConfig, SourceError};
