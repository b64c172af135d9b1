//! Ingest error types.

use auditdesk_shared::AppError;
use thiserror::Error;

/// Raw input has the wrong shape.
///
/// Bad amounts are not errors: they parse as missing and surface later as
/// numeric-anomaly warnings.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input is not valid JSON.
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A collection is neither an array nor null.
    #[error("Expected `{collection}` to be an array")]
    ExpectedArray {
        /// Collection name.
        collection: &'static str,
    },

    /// An object-valued section is neither an object nor null.
    #[error("Expected `{section}` to be an object")]
    ExpectedObject {
        /// Section name.
        section: &'static str,
    },

    /// A row could not be read.
    #[error("Invalid row {index} in `{collection}`: {source}")]
    InvalidRow {
        /// Collection name.
        collection: &'static str,
        /// Zero-based row index.
        index: usize,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// Sampling method tag not recognized.
    #[error("Unknown sampling method: {0}")]
    UnknownMethod(String),

    /// Sampling configuration has no method tag.
    #[error("Sampling configuration is missing `method`")]
    MissingMethod,
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        Self::Parse(err.to_string())
    }
}
