//! Review workflow for reconciliation codes.
//!
//! Review status is orthogonal to the numeric classification: accepting a
//! major difference records a decision but never changes the difference or
//! its class. The valid transitions are:
//! - Unreviewed → Accepted (accept)
//! - Unreviewed → Rejected (reject)
//! - Accepted | Rejected → Unreviewed (reopen)

use std::fmt;

use auditdesk_shared::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ReconciliationError;
use super::variance::VarianceClass;

/// Workflow status of a reconciliation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// No decision yet.
    #[default]
    Unreviewed,
    /// Difference approved.
    Accepted,
    /// Flagged for investigation.
    Rejected,
}

impl ReviewStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unreviewed => "unreviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Applies an action, returning the next status.
    pub fn apply(self, action: &ReviewAction) -> Result<Self, ReconciliationError> {
        match (self, action) {
            (Self::Unreviewed, ReviewAction::Accept { .. }) => Ok(Self::Accepted),
            (Self::Unreviewed, ReviewAction::Reject { .. }) => Ok(Self::Rejected),
            (Self::Accepted | Self::Rejected, ReviewAction::Reopen) => Ok(Self::Unreviewed),
            (from, action) => Err(ReconciliationError::InvalidReviewTransition {
                from,
                action: action.name(),
            }),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer's action on a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ReviewAction {
    /// Approve the difference.
    Accept {
        /// Reviewer.
        #[serde(default)]
        by: Option<UserId>,
        /// Optional justification.
        #[serde(default)]
        comment: Option<String>,
    },
    /// Flag the difference for investigation.
    Reject {
        /// Reviewer.
        #[serde(default)]
        by: Option<UserId>,
        /// Why the difference is not acceptable.
        reason: String,
    },
    /// Withdraw an earlier decision.
    Reopen,
}

impl ReviewAction {
    /// Short verb naming the action.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Accept { .. } => "accept",
            Self::Reject { .. } => "reject",
            Self::Reopen => "reopen",
        }
    }
}

/// A stored review decision with its audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    /// Status after the decision.
    pub status: ReviewStatus,
    /// Who decided.
    pub decided_by: Option<UserId>,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
    /// Comment or rejection reason.
    pub comment: Option<String>,
}

impl ReviewDecision {
    /// Applies `action` on top of the stored decision (absent means unreviewed).
    pub fn decide(
        previous: Option<&Self>,
        action: ReviewAction,
        at: DateTime<Utc>,
    ) -> Result<Self, ReconciliationError> {
        let current = previous.map_or(ReviewStatus::Unreviewed, |d| d.status);
        let status = current.apply(&action)?;
        let (decided_by, comment) = match action {
            ReviewAction::Accept { by, comment } => (by, comment),
            ReviewAction::Reject { by, reason } => (by, Some(reason)),
            ReviewAction::Reopen => (None, None),
        };
        Ok(Self {
            status,
            decided_by,
            decided_at: at,
            comment,
        })
    }
}

/// Status shown for a code: the stored decision, or the implicit one.
///
/// Matches and minor differences without a decision count as accepted;
/// major differences without a decision are unreviewed. A reopened decision
/// is stored as `Unreviewed` and falls back to the implicit status.
#[must_use]
pub fn effective_status(class: VarianceClass, decision: Option<&ReviewDecision>) -> ReviewStatus {
    match decision.map(|d| d.status) {
        Some(status @ (ReviewStatus::Accepted | ReviewStatus::Rejected)) => status,
        _ if class.requires_review() => ReviewStatus::Unreviewed,
        _ => ReviewStatus::Accepted,
    }
}
