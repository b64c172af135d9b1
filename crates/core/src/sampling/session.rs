//! Persisted sampling sessions.
//!
//! A session pairs an engine result with the auditor's "tested" marks. Marks
//! live on the session copy; the engine result itself is never touched.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::SamplingError;
use super::types::SamplingResult;

/// A sampling result plus the ids of sampled transactions marked as tested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSession {
    /// Engine output this session was created from.
    pub result: SamplingResult,
    /// Seed that reproduces the sample, when one was used.
    pub seed: Option<u64>,
    /// Ids of sampled transactions already tested.
    pub tested: BTreeSet<String>,
    /// When the sample was drawn.
    pub created_at: DateTime<Utc>,
}

impl SampleSession {
    /// Starts a session with nothing tested.
    #[must_use]
    pub fn new(result: SamplingResult, seed: Option<u64>) -> Self {
        Self {
            result,
            seed,
            tested: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Returns a copy with `transaction_id` marked as tested.
    pub fn mark_tested(&self, transaction_id: &str) -> Result<Self, SamplingError> {
        if !self.result.sample.iter().any(|tx| tx.id == transaction_id) {
            return Err(SamplingError::NotInSample(transaction_id.to_string()));
        }
        let mut next = self.clone();
        next.tested.insert(transaction_id.to_string());
        Ok(next)
    }

    /// Number of sampled items marked as tested.
    #[must_use]
    pub fn tested_count(&self) -> usize {
        self.tested.len()
    }

    /// True when every sampled item has been tested.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tested.len() == self.result.sample.len()
    }
}
