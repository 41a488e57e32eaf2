use thiserror::Error;

/// Convenience result type for pipeline stages.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type returned by the acquisition, reshape and statistics stages.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Remote endpoint or local file could not be reached or read.
    #[error("source unavailable: {message}")]
    SourceUnavailable { message: String },

    /// None of the candidate text encodings decoded the file.
    #[error("could not decode '{path}' with any of [{tried}]")]
    EncodingUnresolved { path: String, tried: String },

    /// Expected identifying or value columns are absent.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A partition is empty, too small, or has no spread.
    #[error("insufficient data: {message}")]
    InsufficientData { message: String },
}

impl AnalysisError {
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        AnalysisError::SourceUnavailable {
            message: message.into(),
        }
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        AnalysisError::SchemaMismatch {
            message: message.into(),
        }
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        AnalysisError::InsufficientData {
            message: message.into(),
        }
    }
}
