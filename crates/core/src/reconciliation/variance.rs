//! Variance classification policy.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Differences strictly below one cent are a match.
pub const MATCH_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Differences up to and including this amount are minor.
pub const MINOR_LIMIT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Classification of a reconciliation difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceClass {
    /// `|difference| < 0.01`.
    Match,
    /// `0.01 <= |difference| <= 5.00`; accepted without review.
    Minor,
    /// `|difference| > 5.00`; needs an explicit accept or reject.
    Major,
}

impl VarianceClass {
    /// Returns the string representation of the class.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }

    /// True when the difference needs an explicit review decision.
    #[must_use]
    pub fn requires_review(&self) -> bool {
        matches!(self, Self::Major)
    }
}

impl fmt::Display for VarianceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a signed difference by magnitude.
#[must_use]
pub fn classify_variance(difference: Decimal) -> VarianceClass {
    let magnitude = difference.abs();
    if magnitude < MATCH_TOLERANCE {
        VarianceClass::Match
    } else if magnitude <= MINOR_LIMIT {
        VarianceClass::Minor
    } else {
        VarianceClass::Major
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), VarianceClass::Match)]
    #[case(dec!(0.009), VarianceClass::Match)]
    #[case(dec!(-0.0099), VarianceClass::Match)]
    #[case(dec!(0.01), VarianceClass::Minor)]
    #[case(dec!(0.010001), VarianceClass::Minor)]
    #[case(dec!(-0.01), VarianceClass::Minor)]
    #[case(dec!(5.00), VarianceClass::Minor)]
    #[case(dec!(-5), VarianceClass::Minor)]
    #[case(dec!(5.01), VarianceClass::Major)]
    #[case(dec!(5.000001), VarianceClass::Major)]
    #[case(dec!(-1000), VarianceClass::Major)]
    fn test_classify_variance(#[case] difference: Decimal, #[case] expected: VarianceClass) {
        assert_eq!(classify_variance(difference), expected);
    }

    #[test]
    fn test_threshold_constants() {
        assert_eq!(MATCH_TOLERANCE, dec!(0.01));
        assert_eq!(MINOR_LIMIT, dec!(5));
    }

    #[test]
    fn test_requires_review() {
        assert!(!VarianceClass::Match.requires_review());
        assert!(!VarianceClass::Minor.requires_review());
        assert!(VarianceClass::Major.requires_review());
    }

    #[test]
    fn test_display() {
        assert_eq!(VarianceClass::Minor.to_string(), "minor");
        assert_eq!(
            serde_json::to_string(&VarianceClass::Major).unwrap(),
            "\"major\""
        );
    }
}
