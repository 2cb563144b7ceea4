use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for pdf-reader-core
///
/// Every variant is fatal to the operation that produced it:
/// - Document operations (opening, paging, text extraction)
/// - Snapshot operations (reading, writing, decoding the cache file)
/// - LLM operations (requests, responses, model pulls)
/// - Configuration operations (loading, validation)
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Document Errors
    // ==========================================================================
    /// Failed to open or parse a PDF file
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    /// Invalid page number requested
    #[error("invalid page number {page} (document has {total} pages)")]
    PdfInvalidPage { page: usize, total: usize },

    /// Failed to extract text from a PDF page
    #[error("failed to extract text from page {page}: {reason}")]
    PdfTextExtraction { page: usize, reason: String },

    // ==========================================================================
    // Snapshot Errors
    // ==========================================================================
    /// Failed to read the snapshot file
    #[error("failed to read snapshot {}: {reason}", path.display())]
    SnapshotRead { path: PathBuf, reason: String },

    /// Failed to write the snapshot file
    #[error("failed to write snapshot {}: {reason}", path.display())]
    SnapshotWrite { path: PathBuf, reason: String },

    /// Snapshot is not valid JSON or is missing one of its keys
    #[error("failed to decode snapshot: {0}")]
    SnapshotParse(String),

    /// Snapshot decoded but its arrays are inconsistent
    #[error("inconsistent snapshot: {0}")]
    SnapshotInvalid(String),

    // ==========================================================================
    // LLM Errors
    // ==========================================================================
    /// Request to the model service failed
    #[error("LLM request failed: {0}")]
    LlmRequest(String),

    /// Model service answered with something we cannot use
    #[error("invalid LLM response: {0}")]
    LlmInvalidResponse(String),

    /// Request to the model service timed out
    #[error("LLM request timed out")]
    LlmTimeout,

    /// Pulling the model onto the local service failed
    #[error("failed to pull model '{model}': {reason}")]
    ModelPull { model: String, reason: String },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },
}

impl Error {
    /// Map a reqwest failure onto the LLM error variants.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::LlmTimeout
        } else if err.is_decode() {
            Self::LlmInvalidResponse(err.to_string())
        } else {
            Self::LlmRequest(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::PdfInvalidPage { page: 400, total: 320 };
        assert_eq!(err.to_string(), "invalid page number 400 (document has 320 pages)");

        let err = Error::SnapshotWrite {
            path: PathBuf::from("document_text.json"),
            reason: "disk full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write snapshot document_text.json: disk full"
        );
    }
}
