use thiserror::Error;

#[derive(Debug, Error)]
pub enum EetError {
    #[error("Data unavailable: {path} — {reason}")]
    DataUnavailable { path: String, reason: String },

    #[error("Identifier not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Metric skipped: {metric} — {reason}")]
    SkippedMetric { metric: String, reason: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Report assembly failed: {0}")]
    Report(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EetError {
    /// Whether the error only drops a single metric from the analysis.
    pub fn is_soft(&self) -> bool {
        matches!(self, EetError::SkippedMetric { .. })
    }
}

impl From<serde_json::Error> for EetError {
    fn from(e: serde_json::Error) -> Self {
        EetError::SerializationError(e.to_string())
    }
}
