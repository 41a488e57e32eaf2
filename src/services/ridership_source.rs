//! Trait for anything that can hand the pipeline a wide ridership table.

use crate::error::AnalysisResult;
use crate::records::RawTable;

/// Where the raw table came from, for logs and the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Paginated Seoul Open Data API, for one reporting period (`YYYYMM`).
    OpenApi { dataset: String, period: String },
    /// Local CSV export.
    File { path: String },
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::OpenApi { dataset, period } => write!(f, "open-api:{dataset}/{period}"),
            SourceKind::File { path } => write!(f, "file:{path}"),
        }
    }
}

/// Abstraction over ridership providers (remote API, local export).
pub trait RidershipSource {
    fn kind(&self) -> SourceKind;

    /// Produces the complete raw table. No caching between calls.
    fn load(&self) -> AnalysisResult<RawTable>;
}
