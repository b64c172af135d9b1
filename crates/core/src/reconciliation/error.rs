//! Reconciliation error types.

use auditdesk_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use super::review::ReviewStatus;

/// Reconciliation-related errors.
///
/// Engine runs never fail; these come from the adjustment and review
/// operations layered on top.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconciliationError {
    /// Adjustment components must be non-negative.
    #[error("Adjustment {field} cannot be negative, got {value}")]
    NegativeAdjustment {
        /// Offending field (`addition` or `deduction`).
        field: &'static str,
        /// Supplied value.
        value: Decimal,
    },

    /// Review action not allowed from the current status.
    #[error("Cannot {action} a code that is {from}")]
    InvalidReviewTransition {
        /// Current status.
        from: ReviewStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// Code is not part of the reconciliation.
    #[error("Reconciliation code not found: {0}")]
    CodeNotFound(String),
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        match err {
            ReconciliationError::NegativeAdjustment { .. } => Self::Validation(err.to_string()),
            ReconciliationError::InvalidReviewTransition { .. } => Self::Conflict(err.to_string()),
            ReconciliationError::CodeNotFound(_) => Self::NotFound(err.to_string()),
        }
    }
}
