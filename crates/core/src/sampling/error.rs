//! Sampling error types.

use auditdesk_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Sampling-related errors.
///
/// Every variant is raised before any sample is drawn.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplingError {
    /// Simple random sampling needs at least one item.
    #[error("Sample size must be at least 1")]
    InvalidSampleSize,

    /// Coverage target outside (0, 100].
    #[error("Coverage target must be greater than 0 and at most 100, got {0}")]
    InvalidCoverageTarget(Decimal),

    /// Monetary unit threshold below zero.
    #[error("Threshold amount cannot be negative, got {0}")]
    NegativeThreshold(Decimal),

    /// Policy knobs are inconsistent.
    #[error("Invalid sampling policy: {0}")]
    InvalidPolicy(String),

    /// Transaction is not part of the sample.
    #[error("Transaction {0} is not in the sample")]
    NotInSample(String),
}

impl From<SamplingError> for AppError {
    fn from(err: SamplingError) -> Self {
        match err {
            SamplingError::NotInSample(_) => Self::NotFound(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
