//! Sampling data types.

use std::fmt;

use auditdesk_shared::config::SamplingSettings;
use auditdesk_shared::types::amount::deserialize_lenient;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::SamplingError;

/// A ledger transaction in the sampling population.
///
/// Sourced per fiscal period and ledger version; never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier (voucher line).
    pub id: String,
    /// Posting date.
    #[serde(default, alias = "transactionDate")]
    pub transaction_date: Option<NaiveDate>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// General ledger account number.
    #[serde(default, alias = "accountNumber")]
    pub account_number: String,
    /// Signed net amount; `None` when the source value was missing or not a number.
    #[serde(
        default,
        alias = "netAmount",
        deserialize_with = "deserialize_lenient"
    )]
    pub net_amount: Option<Decimal>,
}

impl Transaction {
    /// Net amount with missing values treated as zero.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.net_amount.unwrap_or_default()
    }
}

/// Sampling method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    /// Uniform sampling without replacement.
    SimpleRandom,
    /// Coverage-driven sampling per amount stratum.
    Stratified,
    /// Key items above a threshold plus a size-weighted residual draw.
    MonetaryUnit,
}

impl SamplingMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimpleRandom => "simple_random",
            Self::Stratified => "stratified",
            Self::MonetaryUnit => "monetary_unit",
        }
    }
}

impl fmt::Display for SamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling request, one variant per method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SamplingConfiguration {
    /// Draw `sample_size` items uniformly.
    SimpleRandom {
        /// Number of items to draw (at least 1).
        #[serde(alias = "sampleSize")]
        sample_size: usize,
    },
    /// Reach `coverage_target_percent` of the absolute amount in each stratum.
    Stratified {
        /// Target coverage, in (0, 100].
        #[serde(alias = "coverageTargetPercent")]
        coverage_target_percent: Decimal,
    },
    /// Test every item above `threshold_amount`, then draw proportionally to size.
    MonetaryUnit {
        /// Key-item threshold on absolute amount (at least 0).
        #[serde(alias = "thresholdAmount")]
        threshold_amount: Decimal,
    },
}

impl SamplingConfiguration {
    /// Returns the method this configuration selects.
    #[must_use]
    pub const fn method(&self) -> SamplingMethod {
        match self {
            Self::SimpleRandom { .. } => SamplingMethod::SimpleRandom,
            Self::Stratified { .. } => SamplingMethod::Stratified,
            Self::MonetaryUnit { .. } => SamplingMethod::MonetaryUnit,
        }
    }

    /// Checks the per-method validity rules.
    pub fn validate(&self) -> Result<(), SamplingError> {
        match *self {
            Self::SimpleRandom { sample_size } if sample_size == 0 => {
                Err(SamplingError::InvalidSampleSize)
            }
            Self::Stratified {
                coverage_target_percent: pct,
            } if pct <= Decimal::ZERO || pct > Decimal::ONE_HUNDRED => {
                Err(SamplingError::InvalidCoverageTarget(pct))
            }
            Self::MonetaryUnit { threshold_amount } if threshold_amount < Decimal::ZERO => {
                Err(SamplingError::NegativeThreshold(threshold_amount))
            }
            _ => Ok(()),
        }
    }
}

/// Policy knobs shared by every sampling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Ascending absolute-amount boundaries separating strata.
    pub stratum_boundaries: Vec<Decimal>,
    /// Percent of the residual pool drawn after MUS key items.
    pub mus_residual_percent: Decimal,
    /// Lower bound on the residual draw count.
    pub mus_min_residual: usize,
    /// Upper bound on the residual draw count.
    pub mus_max_residual: usize,
}

impl SamplingPolicy {
    /// Checks that the knobs are consistent.
    pub fn validate(&self) -> Result<(), SamplingError> {
        if self
            .stratum_boundaries
            .iter()
            .any(|b| *b <= Decimal::ZERO)
        {
            return Err(SamplingError::InvalidPolicy(
                "stratum boundaries must be positive".to_string(),
            ));
        }
        if self.stratum_boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SamplingError::InvalidPolicy(
                "stratum boundaries must be strictly ascending".to_string(),
            ));
        }
        if self.mus_residual_percent < Decimal::ZERO
            || self.mus_residual_percent > Decimal::ONE_HUNDRED
        {
            return Err(SamplingError::InvalidPolicy(format!(
                "residual percent must be within 0..=100, got {}",
                self.mus_residual_percent
            )));
        }
        if self.mus_min_residual > self.mus_max_residual {
            return Err(SamplingError::InvalidPolicy(format!(
                "minimum residual draw {} exceeds maximum {}",
                self.mus_min_residual, self.mus_max_residual
            )));
        }
        Ok(())
    }
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self::from(&SamplingSettings::default())
    }
}

impl From<&SamplingSettings> for SamplingPolicy {
    fn from(settings: &SamplingSettings) -> Self {
        Self {
            stratum_boundaries: settings.stratum_boundaries.clone(),
            mus_residual_percent: settings.mus_residual_percent,
            mus_min_residual: settings.mus_min_residual,
            mus_max_residual: settings.mus_max_residual,
        }
    }
}

/// Summary statistics of a sampling run.
///
/// Amounts are sums of absolute net amounts, so `sampled_amount <= total_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingSummary {
    /// Population size.
    pub total_count: usize,
    /// Number of sampled items.
    pub sampled_count: usize,
    /// Absolute amount of the population.
    pub total_amount: Decimal,
    /// Absolute amount of the sample.
    pub sampled_amount: Decimal,
    /// `sampled_amount / total_amount * 100`, two decimals; 0 for a zero population.
    pub coverage_percent: Decimal,
    /// Method that produced the sample.
    pub method: SamplingMethod,
    /// Items taken as MUS key items (0 for other methods).
    pub key_item_count: usize,
    /// Whether the stratified coverage target was met (`None` for other methods).
    pub target_reached: Option<bool>,
}

/// A non-fatal issue found while sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplingWarning {
    /// Amount was unusable (missing, non-numeric, or overflowing the
    /// population total) and was treated as zero.
    NumericAnomaly {
        /// Offending transaction.
        transaction_id: String,
    },
}

/// Output of one sampling run. Replaced, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingResult {
    /// Sampled transactions, in population order.
    pub sample: Vec<Transaction>,
    /// Summary statistics.
    pub summary: SamplingSummary,
    /// Numeric anomalies encountered.
    #[serde(default)]
    pub warnings: Vec<SamplingWarning>,
}

impl SamplingResult {
    /// The all-zero result returned for an empty population.
    #[must_use]
    pub fn empty(method: SamplingMethod) -> Self {
        Self {
            sample: Vec::new(),
            summary: SamplingSummary {
                total_count: 0,
                sampled_count: 0,
                total_amount: Decimal::ZERO,
                sampled_amount: Decimal::ZERO,
                coverage_percent: Decimal::ZERO,
                method,
                key_item_count: 0,
                target_reached: None,
            },
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_configuration_validate() {
        assert_eq!(
            SamplingConfiguration::SimpleRandom { sample_size: 0 }.validate(),
            Err(SamplingError::InvalidSampleSize)
        );
        assert!(SamplingConfiguration::SimpleRandom { sample_size: 1 }.validate().is_ok());
        assert_eq!(
            SamplingConfiguration::Stratified {
                coverage_target_percent: dec!(0)
            }
            .validate(),
            Err(SamplingError::InvalidCoverageTarget(dec!(0)))
        );
        assert_eq!(
            SamplingConfiguration::Stratified {
                coverage_target_percent: dec!(100.01)
            }
            .validate(),
            Err(SamplingError::InvalidCoverageTarget(dec!(100.01)))
        );
        assert!(
            SamplingConfiguration::Stratified {
                coverage_target_percent: dec!(100)
            }
            .validate()
            .is_ok()
        );
        assert_eq!(
            SamplingConfiguration::MonetaryUnit {
                threshold_amount: dec!(-1)
            }
            .validate(),
            Err(SamplingError::NegativeThreshold(dec!(-1)))
        );
        assert!(
            SamplingConfiguration::MonetaryUnit {
                threshold_amount: dec!(0)
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_configuration_tagged_json() {
        let config: SamplingConfiguration =
            serde_json::from_value(json!({"method": "stratified", "coverage_target_percent": "80"}))
                .unwrap();
        assert_eq!(
            config,
            SamplingConfiguration::Stratified {
                coverage_target_percent: dec!(80)
            }
        );

        let config: SamplingConfiguration =
            serde_json::from_value(json!({"method": "simple_random", "sampleSize": 25})).unwrap();
        assert_eq!(config.method(), SamplingMethod::SimpleRandom);

        let unknown = serde_json::from_value::<SamplingConfiguration>(json!({"method": "cluster"}));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_transaction_lenient_amount() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": "V-1",
            "transactionDate": "2025-03-31",
            "description": "Lønn mars",
            "accountNumber": "5000",
            "netAmount": "NaN"
        }))
        .unwrap();
        assert_eq!(tx.net_amount, None);
        assert_eq!(tx.amount(), Decimal::ZERO);
        assert_eq!(tx.account_number, "5000");
    }

    #[test]
    fn test_policy_validate() {
        assert!(SamplingPolicy::default().validate().is_ok());

        let mut policy = SamplingPolicy::default();
        policy.stratum_boundaries = vec![dec!(10000), dec!(1000)];
        assert!(matches!(policy.validate(), Err(SamplingError::InvalidPolicy(_))));

        let mut policy = SamplingPolicy::default();
        policy.mus_min_residual = 10;
        policy.mus_max_residual = 5;
        assert!(matches!(policy.validate(), Err(SamplingError::InvalidPolicy(_))));
    }
}
