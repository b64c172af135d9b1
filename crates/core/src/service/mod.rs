//! Orchestration of the engines over injected ports.
//!
//! The service loads inputs through an [`AuditDataSource`], runs the pure
//! engines, and persists reviewer state. Engines never see the ports.

use std::collections::BTreeMap;

use auditdesk_shared::types::UserId;
use auditdesk_shared::{AppError, AppResult};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::ports::{AuditDataSource, PeriodKey, SessionStore, TransactionQuery};
use crate::reconciliation::{
    CodeAnnotation, ManualAdjustment, ReconciliationEngine, ReconciliationError,
    ReconciliationRun, ReviewAction, ReviewDecision,
};
use crate::sampling::{
    SampleSession, SamplingConfiguration, SamplingEngine, SamplingPolicy, SeededRandom,
    Transaction,
};


/// Trial balances at least this long are aggregated on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// Audit workflow service.
pub struct AuditService<D, S> {
    data: D,
    sessions: S,
    sampler: SamplingEngine,
    default_seed: Option<u64>,
}

impl<D: AuditDataSource, S: SessionStore> AuditService<D, S> {
    /// Creates a service after validating the sampling policy.
    pub fn new(data: D, sessions: S, policy: SamplingPolicy) -> AppResult<Self> {
        Ok(Self {
            data,
            sessions,
            sampler: SamplingEngine::new(policy)?,
            default_seed: None,
        })
    }

    /// Seed used when a sampling request carries none.
    #[must_use]
    pub fn with_default_seed(mut self, seed: Option<u64>) -> Self {
        self.default_seed = seed;
        self
    }

    /// Draws a sample from the queried transactions.
    ///
    /// Without a seed (request or default) the draw uses OS entropy and the
    /// session records no seed.
    #[instrument(skip(self, config), fields(period = %query.period, method = %config.method()))]
    pub fn sample(
        &self,
        query: &TransactionQuery,
        config: &SamplingConfiguration,
        seed: Option<u64>,
    ) -> AppResult<SampleSession> {
        let transactions = self.data.transactions(query)?;
        self.sample_transactions(&transactions, config, seed)
    }

    /// Draws a sample from a population supplied by the caller.
    ///
    /// Seed resolution is the same as for [`Self::sample`].
    pub fn sample_transactions(
        &self,
        transactions: &[Transaction],
        config: &SamplingConfiguration,
        seed: Option<u64>,
    ) -> AppResult<SampleSession> {
        let mut rng = match seed.or(self.default_seed) {
            Some(seed) => SeededRandom::from_seed_u64(seed),
            None => SeededRandom::from_entropy(),
        };
        let result = self.sampler.compute_sample(transactions, config, &mut rng)?;
        info!(
            sampled = result.summary.sampled_count,
            total = result.summary.total_count,
            "Sample drawn"
        );
        Ok(SampleSession::new(result, rng.seed()))
    }

    /// Reconciles a period with its stored annotations.
    #[instrument(skip(self), fields(period = %period))]
    pub fn reconcile(&self, period: &PeriodKey) -> AppResult<ReconciliationRun> {
        let a07 = self.data.a07(period)?;
        let trial_balance = self.data.trial_balance(period)?;
        let rules = self.data.mapping_rules(period.client_id)?;
        let annotations = self.data.annotations(period)?;

        let run = if trial_balance.len() >= PARALLEL_THRESHOLD {
            ReconciliationEngine::compute_parallel(&a07, &trial_balance, &rules, &annotations)
        } else {
            ReconciliationEngine::compute(&a07, &trial_balance, &rules, &annotations)
        };
        info!(codes = run.codes.len(), warnings = run.warnings.len(), "Period reconciled");
        Ok(run)
    }

    /// Stores a manual adjustment for `code`, replacing any earlier one.
    pub fn adjust(
        &self,
        period: &PeriodKey,
        code: &str,
        addition: Decimal,
        deduction: Decimal,
        note: impl Into<String>,
    ) -> AppResult<CodeAnnotation> {
        let adjustment = ManualAdjustment::new(addition, deduction, note)?;
        self.update_annotation(period, code, |annotation| {
            annotation.adjustment = Some(adjustment);
            Ok(())
        })
    }

    /// Removes the manual adjustment of `code`.
    pub fn clear_adjustment(&self, period: &PeriodKey, code: &str) -> AppResult<CodeAnnotation> {
        self.update_annotation(period, code, |annotation| {
            annotation.adjustment = None;
            Ok(())
        })
    }

    /// Sets or clears the reviewer note of `code`.
    pub fn annotate(
        &self,
        period: &PeriodKey,
        code: &str,
        note: Option<String>,
    ) -> AppResult<CodeAnnotation> {
        self.update_annotation(period, code, |annotation| {
            annotation.note = note.filter(|n| !n.trim().is_empty());
            Ok(())
        })
    }

    /// Applies a review action to `code`.
    pub fn review(
        &self,
        period: &PeriodKey,
        code: &str,
        action: ReviewAction,
    ) -> AppResult<ReviewDecision> {
        let updated = self.update_annotation(period, code, |annotation| {
            let decision = ReviewDecision::decide(annotation.review.as_ref(), action, Utc::now())?;
            annotation.review = Some(decision);
            Ok(())
        })?;
        updated
            .review
            .ok_or_else(|| AppError::Internal("review decision not stored".to_string()))
    }

    /// Accepts `code` on behalf of `reviewer`.
    pub fn accept(
        &self,
        period: &PeriodKey,
        code: &str,
        reviewer: Option<UserId>,
        comment: Option<String>,
    ) -> AppResult<ReviewDecision> {
        self.review(
            period,
            code,
            ReviewAction::Accept {
                by: reviewer,
                comment,
            },
        )
    }

    /// Persists a sampling session under `key`.
    pub fn save_sample_session(&self, key: &str, session: &SampleSession) -> AppResult<()> {
        let json = serde_json::to_string(session)?;
        self.sessions.save(key, &json)
    }

    /// Loads the sampling session stored under `key`.
    pub fn load_sample_session(&self, key: &str) -> AppResult<SampleSession> {
        let json = self
            .sessions
            .load(key)?
            .ok_or_else(|| AppError::NotFound(format!("Sampling session not found: {key}")))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Marks a sampled transaction as tested and persists the session.
    pub fn mark_tested(&self, key: &str, transaction_id: &str) -> AppResult<SampleSession> {
        let session = self.load_sample_session(key)?.mark_tested(transaction_id)?;
        self.save_sample_session(key, &session)?;
        Ok(session)
    }

    /// Loads the annotations, checks that `code` is part of the current run,
    /// applies `change`, and saves. Empty annotations are dropped.
    fn update_annotation<F>(
        &self,
        period: &PeriodKey,
        code: &str,
        change: F,
    ) -> AppResult<CodeAnnotation>
    where
        F: FnOnce(&mut CodeAnnotation) -> Result<(), ReconciliationError>,
    {
        if self.reconcile(period)?.code(code).is_none() {
            return Err(ReconciliationError::CodeNotFound(code.to_string()).into());
        }
        let mut annotations: BTreeMap<String, CodeAnnotation> = self.data.annotations(period)?;
        let mut annotation = annotations.remove(code).unwrap_or_default();
        change(&mut annotation)?;
        if !annotation.is_empty() {
            annotations.insert(code.to_string(), annotation.clone());
        }
        self.data.save_annotations(period, &annotations)?;
        info!(%period, code, "Annotation updated");
        Ok(annotation)
    }
}
