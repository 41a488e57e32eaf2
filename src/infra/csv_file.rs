use crate::config::AnalysisConfig;
use crate::error::AnalysisResult;
use crate::parser::read_table;
use crate::records::RawTable;
use crate::services::ridership_source::{RidershipSource, SourceKind};

/// A ridership export on disk, decoded with the configured encodings.
pub struct CsvFileSource {
    path: String,
    encodings: Vec<String>,
}

impl CsvFileSource {
    pub fn new(path: impl Into<String>, config: &AnalysisConfig) -> Self {
        Self {
            path: path.into(),
            encodings: config.encodings.clone(),
        }
    }
}

impl RidershipSource for CsvFileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File {
            path: self.path.clone(),
        }
    }

    fn load(&self) -> AnalysisResult<RawTable> {
        read_table(&self.path, &self.encodings)
    }
}
