//! Run-level totals for dashboards and exports.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::review::ReviewStatus;
use super::types::ReconciliationRun;
use super::variance::VarianceClass;

/// Counts and totals across every code of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Number of codes.
    pub code_count: usize,
    /// Codes classified as match.
    pub match_count: usize,
    /// Codes classified as minor.
    pub minor_count: usize,
    /// Codes classified as major.
    pub major_count: usize,
    /// Codes whose effective review status is not accepted.
    pub unresolved_count: usize,
    /// Codes explicitly rejected.
    pub rejected_count: usize,
    /// Unmapped trial-balance accounts.
    pub unmapped_count: usize,
    /// Recorded warnings.
    pub warning_count: usize,
    /// Sum of adjusted ledger amounts.
    pub total_ledger: Decimal,
    /// Sum of reported A-melding amounts.
    pub total_amelding: Decimal,
    /// Sum of differences.
    pub total_difference: Decimal,
}

impl ReconciliationSummary {
    /// Summarizes a run.
    #[must_use]
    pub fn from_run(run: &ReconciliationRun) -> Self {
        let mut summary = Self {
            code_count: run.codes.len(),
            unmapped_count: run.unmapped.len(),
            warning_count: run.warnings.len(),
            ..Self::default()
        };
        for record in &run.codes {
            match record.status {
                VarianceClass::Match => summary.match_count += 1,
                VarianceClass::Minor => summary.minor_count += 1,
                VarianceClass::Major => summary.major_count += 1,
            }
            if !record.resolved {
                summary.unresolved_count += 1;
            }
            if record.review == ReviewStatus::Rejected {
                summary.rejected_count += 1;
            }
            // Totals saturate at the Decimal bounds.
            summary.total_ledger = summary.total_ledger.saturating_add(record.e);
            summary.total_amelding = summary.total_amelding.saturating_add(record.amelding);
            summary.total_difference = summary.total_difference.saturating_add(record.difference);
        }
        summary
    }

    /// True when every code is resolved.
    #[must_use]
    pub const fn is_fully_resolved(&self) -> bool {
        self.unresolved_count == 0
    }
}
