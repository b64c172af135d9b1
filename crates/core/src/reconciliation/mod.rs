//! Payroll reconciliation: A07 declaration against the trial balance.
//!
//! The engine groups trial-balance accounts into payroll codes through
//! mapping rules, computes `D = A + B - C`, layers manual adjustments on top,
//! and classifies the difference against the reported A-melding amount.

pub mod engine;
pub mod error;
pub mod review;
pub mod summary;
pub mod types;
pub mod variance;


pub use engine::{ReconciliationEngine, compute_reconciliation};
pub use error::ReconciliationError;
pub use review::{ReviewAction, ReviewDecision, ReviewStatus, effective_status};
pub use summary::ReconciliationSummary;
pub use types::{
    A07Entry, AccountDetail, AmountRole, CodeAnnotation, DetailSource, ManualAdjustment,
    MappingRule, ReconciliationCode, ReconciliationRun, ReconciliationWarning, TrialBalanceEntry,
    UnmappedAccount,
};
pub use variance::{MATCH_TOLERANCE, MINOR_LIMIT, VarianceClass, classify_variance};
