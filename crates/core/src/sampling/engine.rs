//! Sampling engine.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use super::error::SamplingError;
use super::random::RandomSource;
use super::types::{
    SamplingConfiguration, SamplingPolicy, SamplingResult, SamplingSummary, SamplingWarning,
    Transaction,
};

/// Draws samples from a transaction population under a fixed policy.
#[derive(Debug, Clone, Default)]
pub struct SamplingEngine {
    policy: SamplingPolicy,
}

/// Indices chosen by one method plus the method-specific summary fields.
struct Selection {
    indices: Vec<usize>,
    key_item_count: usize,
    target_reached: Option<bool>,
}

impl SamplingEngine {
    /// Creates an engine after validating the policy.
    pub fn new(policy: SamplingPolicy) -> Result<Self, SamplingError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> &SamplingPolicy {
        &self.policy
    }

    /// Computes a sample.
    ///
    /// An empty population yields the all-zero result regardless of the
    /// configuration. Otherwise the configuration is validated before any
    /// draw happens.
    pub fn compute_sample<R: RandomSource + ?Sized>(
        &self,
        transactions: &[Transaction],
        config: &SamplingConfiguration,
        rng: &mut R,
    ) -> Result<SamplingResult, SamplingError> {
        if transactions.is_empty() {
            return Ok(SamplingResult::empty(config.method()));
        }
        config.validate()?;

        let mut warnings = Vec::new();
        let mut running_total = Decimal::ZERO;
        let mut magnitudes = Vec::with_capacity(transactions.len());
        for tx in transactions {
            let magnitude = match tx.net_amount {
                None => {
                    warn!(transaction_id = %tx.id, "Missing or non-numeric amount treated as zero");
                    None
                }
                Some(amount) => {
                    let magnitude = amount.abs();
                    let checked = running_total.checked_add(magnitude);
                    if checked.is_none() {
                        warn!(
                            transaction_id = %tx.id,
                            "Amount overflows the population total, treated as zero"
                        );
                    }
                    checked.map(|total| {
                        running_total = total;
                        magnitude
                    })
                }
            };
            if magnitude.is_none() {
                warnings.push(SamplingWarning::NumericAnomaly {
                    transaction_id: tx.id.clone(),
                });
            }
            magnitudes.push(magnitude.unwrap_or_default());
        }

        let mut selection = match *config {
            SamplingConfiguration::SimpleRandom { sample_size } => Selection {
                indices: simple_random(magnitudes.len(), sample_size, rng),
                key_item_count: 0,
                target_reached: None,
            },
            SamplingConfiguration::Stratified {
                coverage_target_percent,
            } => stratified(
                &magnitudes,
                coverage_target_percent,
                &self.policy.stratum_boundaries,
            ),
            SamplingConfiguration::MonetaryUnit { threshold_amount } => {
                self.monetary_unit(&magnitudes, threshold_amount, rng)
            }
        };
        selection.indices.sort_unstable();
        selection.indices.dedup();

        // Every subset of `magnitudes` sums to at most `running_total`.
        let total_amount = running_total;
        let sampled_amount: Decimal = selection.indices.iter().map(|&i| magnitudes[i]).sum();
        let summary = SamplingSummary {
            total_count: transactions.len(),
            sampled_count: selection.indices.len(),
            total_amount,
            sampled_amount,
            coverage_percent: coverage_percent(sampled_amount, total_amount),
            method: config.method(),
            key_item_count: selection.key_item_count,
            target_reached: selection.target_reached,
        };

        debug!(
            method = %summary.method,
            total_count = summary.total_count,
            sampled_count = summary.sampled_count,
            coverage_percent = %summary.coverage_percent,
            "Sample computed"
        );

        Ok(SamplingResult {
            sample: selection
                .indices
                .iter()
                .map(|&i| transactions[i].clone())
                .collect(),
            summary,
            warnings,
        })
    }

    /// Key items above `threshold`, then a probability-proportional-to-size
    /// draw without replacement from the remaining non-zero items.
    fn monetary_unit<R: RandomSource + ?Sized>(
        &self,
        magnitudes: &[Decimal],
        threshold: Decimal,
        rng: &mut R,
    ) -> Selection {
        let (mut indices, mut pool): (Vec<usize>, Vec<usize>) =
            (0..magnitudes.len()).partition(|&i| magnitudes[i] > threshold);
        let key_item_count = indices.len();
        pool.retain(|&i| !magnitudes[i].is_zero());

        let draws = self.residual_draw_count(pool.len());
        for _ in 0..draws {
            let pool_total: Decimal = pool.iter().map(|&i| magnitudes[i]).sum();
            if pool_total.is_zero() {
                break;
            }
            let point = rng.unit_fraction() * pool_total;
            let mut cumulative = Decimal::ZERO;
            let mut pick = pool.len() - 1;
            for (position, &i) in pool.iter().enumerate() {
                cumulative += magnitudes[i];
                if point < cumulative {
                    pick = position;
                    break;
                }
            }
            indices.push(pool.remove(pick));
        }

        Selection {
            indices,
            key_item_count,
            target_reached: None,
        }
    }

    /// `clamp(ceil(pool_len * residual_percent / 100), min, max)`, capped at `pool_len`.
    fn residual_draw_count(&self, pool_len: usize) -> usize {
        if pool_len == 0 {
            return 0;
        }
        let raw = (Decimal::from(pool_len) * self.policy.mus_residual_percent
            / Decimal::ONE_HUNDRED)
            .ceil()
            .to_usize()
            .unwrap_or(self.policy.mus_max_residual);
        raw.max(self.policy.mus_min_residual)
            .min(self.policy.mus_max_residual)
            .min(pool_len)
    }
}

/// Computes a sample with the default policy.
pub fn compute_sample<R: RandomSource + ?Sized>(
    transactions: &[Transaction],
    config: &SamplingConfiguration,
    rng: &mut R,
) -> Result<SamplingResult, SamplingError> {
    SamplingEngine::default().compute_sample(transactions, config, rng)
}

/// Partial Fisher-Yates over the index range.
fn simple_random<R: RandomSource + ?Sized>(len: usize, sample_size: usize, rng: &mut R) -> Vec<usize> {
    let take = sample_size.min(len);
    let mut indices: Vec<usize> = (0..len).collect();
    for i in 0..take {
        let j = i + rng.below(len - i);
        indices.swap(i, j);
    }
    indices.truncate(take);
    indices
}

/// Per stratum, takes the largest items first until the stratum's own
/// sampled amount reaches `target_percent` of the stratum total. Zero-total
/// strata contribute nothing.
fn stratified(magnitudes: &[Decimal], target_percent: Decimal, boundaries: &[Decimal]) -> Selection {
    let mut strata: Vec<Vec<usize>> = vec![Vec::new(); boundaries.len() + 1];
    for (i, magnitude) in magnitudes.iter().enumerate() {
        let stratum = boundaries.iter().take_while(|b| *magnitude >= **b).count();
        strata[stratum].push(i);
    }

    let mut indices = Vec::new();
    for mut stratum in strata {
        let stratum_total: Decimal = stratum.iter().map(|&i| magnitudes[i]).sum();
        if stratum_total.is_zero() {
            continue;
        }
        let stratum_target = stratum_total * (target_percent / Decimal::ONE_HUNDRED);
        stratum.sort_by(|&a, &b| magnitudes[b].cmp(&magnitudes[a]).then(a.cmp(&b)));

        let mut covered = Decimal::ZERO;
        for i in stratum {
            if covered >= stratum_target {
                break;
            }
            covered += magnitudes[i];
            indices.push(i);
        }
    }

    let total: Decimal = magnitudes.iter().copied().sum();
    let sampled: Decimal = indices.iter().map(|&i| magnitudes[i]).sum();
    // A zero population cannot reach a positive target.
    let target_reached =
        !total.is_zero() && sampled >= total * (target_percent / Decimal::ONE_HUNDRED);

    Selection {
        indices,
        key_item_count: 0,
        target_reached: Some(target_reached),
    }
}

fn coverage_percent(sampled: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (sampled / total * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .min(Decimal::ONE_HUNDRED)
}
