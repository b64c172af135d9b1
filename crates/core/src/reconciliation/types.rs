//! Reconciliation data types.

use std::fmt;

use auditdesk_shared::types::amount::deserialize_lenient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReconciliationError;
use super::review::{ReviewDecision, ReviewStatus};
use super::variance::VarianceClass;

/// Column an account balance feeds within its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AmountRole {
    /// Amount booked through profit and loss.
    #[default]
    #[serde(alias = "a")]
    A,
    /// Negative accrual amount.
    #[serde(alias = "b")]
    B,
    /// Positive accrual amount.
    #[serde(alias = "c")]
    C,
}

impl AmountRole {
    /// Returns the column letter.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

impl fmt::Display for AmountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closing balance of one general ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceEntry {
    /// Account number.
    #[serde(alias = "accountNumber", alias = "account_number")]
    pub account: String,
    /// Account name.
    #[serde(default, alias = "accountName")]
    pub name: String,
    /// Closing balance; `None` when missing or not a number.
    #[serde(
        default,
        alias = "closingBalance",
        alias = "amount",
        deserialize_with = "deserialize_lenient"
    )]
    pub balance: Option<Decimal>,
}

/// One reported amount from the A07 payroll declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct A07Entry {
    /// Payroll code.
    pub code: String,
    /// Code description.
    #[serde(default)]
    pub description: String,
    /// Reported amount; `None` when missing or not a number.
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub amount: Option<Decimal>,
}

/// Routes a trial-balance account into a payroll code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// Account the rule applies to.
    #[serde(alias = "sourceAccount")]
    pub source_account: String,
    /// Code that receives the balance.
    #[serde(alias = "targetCode")]
    pub target_code: String,
    /// Column the balance feeds.
    #[serde(default)]
    pub role: AmountRole,
    /// Mapping confidence in `[0, 1]`.
    #[serde(default = "full_confidence")]
    pub confidence: Decimal,
}

const fn full_confidence() -> Decimal {
    Decimal::ONE
}

impl MappingRule {
    /// Creates a rule with full confidence.
    #[must_use]
    pub fn new(source_account: impl Into<String>, target_code: impl Into<String>, role: AmountRole) -> Self {
        Self {
            source_account: source_account.into(),
            target_code: target_code.into(),
            role,
            confidence: Decimal::ONE,
        }
    }

    /// True when the confidence lies within `[0, 1]`.
    #[must_use]
    pub fn has_valid_confidence(&self) -> bool {
        self.confidence >= Decimal::ZERO && self.confidence <= Decimal::ONE
    }
}

/// Manual correction layered on top of a code's computed `D`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManualAdjustment {
    /// Amount added to `D`.
    #[serde(default)]
    pub addition: Decimal,
    /// Amount subtracted from `D`.
    #[serde(default)]
    pub deduction: Decimal,
    /// Reason for the adjustment.
    #[serde(default)]
    pub note: String,
}

impl ManualAdjustment {
    /// Creates an adjustment, rejecting negative components.
    pub fn new(
        addition: Decimal,
        deduction: Decimal,
        note: impl Into<String>,
    ) -> Result<Self, ReconciliationError> {
        if addition < Decimal::ZERO {
            return Err(ReconciliationError::NegativeAdjustment {
                field: "addition",
                value: addition,
            });
        }
        if deduction < Decimal::ZERO {
            return Err(ReconciliationError::NegativeAdjustment {
                field: "deduction",
                value: deduction,
            });
        }
        Ok(Self {
            addition,
            deduction,
            note: note.into(),
        })
    }

    /// True when both components are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.addition.is_zero() && self.deduction.is_zero()
    }

    /// `addition - deduction`, saturating at the Decimal bounds.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.addition.saturating_sub(self.deduction)
    }

    /// Copy with negative components replaced by zero, and whether anything changed.
    pub(crate) fn clamped(&self) -> (Self, bool) {
        let addition = self.addition.max(Decimal::ZERO);
        let deduction = self.deduction.max(Decimal::ZERO);
        let changed = addition != self.addition || deduction != self.deduction;
        (
            Self {
                addition,
                deduction,
                note: self.note.clone(),
            },
            changed,
        )
    }
}

/// Origin of an audit-trail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailSource {
    /// Trial-balance account balance.
    TrialBalance,
    /// A07 declaration row.
    A07,
    /// Manual adjustment.
    Rule,
}

/// One line of a code's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetail {
    /// Account number, or the code for A07 and adjustment lines.
    pub account: String,
    /// Account name, description or adjustment note.
    pub name: String,
    /// Amount contributed.
    pub amount: Decimal,
    /// Where the line came from.
    pub source: DetailSource,
    /// Column fed, for trial-balance lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AmountRole>,
}

/// Reviewer state stored per code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeAnnotation {
    /// Manual adjustment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<ManualAdjustment>,
    /// Last review decision, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewDecision>,
    /// Free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CodeAnnotation {
    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjustment.is_none() && self.review.is_none() && self.note.is_none()
    }
}

/// Reconciliation result for one payroll code.
///
/// `d = a + b - c`, `e = d + addition - deduction`, `difference = e - amelding`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationCode {
    /// Payroll code.
    pub code: String,
    /// Description from the declaration, or the code itself.
    pub description: String,
    /// Mapped accounts contributing to the code, sorted.
    pub accounts: Vec<String>,
    /// Profit and loss amounts.
    pub a: Decimal,
    /// Negative accruals.
    pub b: Decimal,
    /// Positive accruals.
    pub c: Decimal,
    /// `a + b - c`.
    pub d: Decimal,
    /// `d` after the manual adjustment.
    pub e: Decimal,
    /// Amount reported in the A-melding.
    pub amelding: Decimal,
    /// `e - amelding`.
    pub difference: Decimal,
    /// Variance class of `difference`.
    pub status: VarianceClass,
    /// Effective review status.
    pub review: ReviewStatus,
    /// True when the effective review status is accepted.
    pub resolved: bool,
    /// Applied manual adjustment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<ManualAdjustment>,
    /// Reviewer note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Audit trail.
    pub details: Vec<AccountDetail>,
}

/// Trial-balance account no rule maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmappedAccount {
    /// Account number.
    pub account: String,
    /// Account name.
    pub name: String,
    /// Balance, missing values as zero.
    pub balance: Decimal,
}

/// Non-fatal finding recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconciliationWarning {
    /// Trial-balance account without a mapping rule.
    UnmappedAccount {
        /// Account number.
        account: String,
    },
    /// Declared code without any mapped ledger account.
    MissingLedgerActivity {
        /// Payroll code.
        code: String,
    },
    /// Amount treated as zero: missing, non-numeric, or beyond the range the
    /// run can total. With source `Rule`, the code's adjustment was not applied.
    NumericAnomaly {
        /// Input collection.
        source: DetailSource,
        /// Account number or code of the row.
        reference: String,
    },
    /// Rule dropped because its confidence is outside `[0, 1]`.
    RuleIgnored {
        /// Account of the rule.
        source_account: String,
        /// Code of the rule.
        target_code: String,
        /// Offending confidence.
        confidence: Decimal,
    },
    /// Negative adjustment components replaced by zero.
    AdjustmentClamped {
        /// Payroll code.
        code: String,
    },
}

/// Output of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconciliationRun {
    /// One record per code, ordered by code.
    pub codes: Vec<ReconciliationCode>,
    /// Unmapped trial-balance accounts, in input order.
    pub unmapped: Vec<UnmappedAccount>,
    /// Non-fatal findings, in discovery order.
    pub warnings: Vec<ReconciliationWarning>,
}

impl ReconciliationRun {
    /// Looks up a code's record.
    #[must_use]
    pub fn code(&self, code: &str) -> Option<&ReconciliationCode> {
        self.codes
            .binary_search_by(|record| record.code.as_str().cmp(code))
            .ok()
            .map(|i| &self.codes[i])
    }

    /// True when the run produced no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_adjustment_rejects_negative() {
        assert_eq!(
            ManualAdjustment::new(dec!(-1), dec!(0), ""),
            Err(ReconciliationError::NegativeAdjustment {
                field: "addition",
                value: dec!(-1),
            })
        );
        assert!(matches!(
            ManualAdjustment::new(dec!(0), dec!(-0.5), ""),
            Err(ReconciliationError::NegativeAdjustment {
                field: "deduction",
                ..
            })
        ));
    }

    #[test]
    fn test_adjustment_net_and_zero() {
        let adj = ManualAdjustment::new(dec!(250), dec!(100), "Periodisering").unwrap();
        assert_eq!(adj.net(), dec!(150));
        assert!(!adj.is_zero());
        assert!(ManualAdjustment::default().is_zero());
    }

    #[test]
    fn test_adjustment_clamped() {
        let raw = ManualAdjustment {
            addition: dec!(-10),
            deduction: dec!(3),
            note: "import".to_string(),
        };
        let (clamped, changed) = raw.clamped();
        assert!(changed);
        assert_eq!(clamped.addition, Decimal::ZERO);
        assert_eq!(clamped.deduction, dec!(3));

        let (_, changed) = clamped.clamped();
        assert!(!changed);
    }

    #[test]
    fn test_mapping_rule_defaults() {
        let rule: MappingRule =
            serde_json::from_str(r#"{"sourceAccount": "5000", "targetCode": "FP"}"#).unwrap();
        assert_eq!(rule.role, AmountRole::A);
        assert_eq!(rule.confidence, Decimal::ONE);
        assert!(rule.has_valid_confidence());

        let rule: MappingRule = serde_json::from_str(
            r#"{"source_account": "2940", "target_code": "FP", "role": "b", "confidence": 1.5}"#,
        )
        .unwrap();
        assert_eq!(rule.role, AmountRole::B);
        assert!(!rule.has_valid_confidence());
    }

    #[test]
    fn test_lenient_rows() {
        let tb: TrialBalanceEntry =
            serde_json::from_str(r#"{"accountNumber": "5000", "balance": "120 000,00"}"#).unwrap();
        assert_eq!(tb.balance, Some(dec!(120000)));
        assert_eq!(tb.name, "");

        let a07: A07Entry = serde_json::from_str(r#"{"code": "FP", "amount": "NaN"}"#).unwrap();
        assert_eq!(a07.amount, None);
    }

    #[test]
    fn test_warning_tagged_json() {
        let warning = ReconciliationWarning::MissingLedgerActivity {
            code: "FP".to_string(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "missing_ledger_activity");
        assert_eq!(json["code"], "FP");
    }
}
