//! In-memory adapters.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use auditdesk_shared::types::ClientId;
use auditdesk_shared::{AppError, AppResult};

use super::types::{PeriodKey, TransactionQuery};
use super::{AuditDataSource, SessionStore};
use crate::reconciliation::{A07Entry, CodeAnnotation, MappingRule, TrialBalanceEntry};
use crate::sampling::Transaction;

fn poisoned() -> AppError {
    AppError::Internal("in-memory store lock poisoned".to_string())
}

/// Session store backed by a map.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One period's worth of inputs.
#[derive(Debug, Clone, Default)]
pub struct PeriodData {
    /// Ledger transactions.
    pub transactions: Vec<Transaction>,
    /// Closing balances.
    pub trial_balance: Vec<TrialBalanceEntry>,
    /// Declaration rows.
    pub a07: Vec<A07Entry>,
}

/// Data source holding everything in memory.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    periods: HashMap<PeriodKey, PeriodData>,
    rules: HashMap<ClientId, Vec<MappingRule>>,
    annotations: RwLock<HashMap<PeriodKey, BTreeMap<String, CodeAnnotation>>>,
}

impl MemoryDataSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the inputs of a period.
    #[must_use]
    pub fn with_period(mut self, period: PeriodKey, data: PeriodData) -> Self {
        self.periods.insert(period, data);
        self
    }

    /// Adds the mapping rules of a client.
    #[must_use]
    pub fn with_rules(mut self, client_id: ClientId, rules: Vec<MappingRule>) -> Self {
        self.rules.insert(client_id, rules);
        self
    }
}

impl AuditDataSource for MemoryDataSource {
    fn transactions(&self, query: &TransactionQuery) -> AppResult<Vec<Transaction>> {
        Ok(self
            .periods
            .get(&query.period)
            .map(|data| {
                data.transactions
                    .iter()
                    .filter(|tx| query.matches(tx))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn trial_balance(&self, period: &PeriodKey) -> AppResult<Vec<TrialBalanceEntry>> {
        Ok(self
            .periods
            .get(period)
            .map(|data| data.trial_balance.clone())
            .unwrap_or_default())
    }

    fn a07(&self, period: &PeriodKey) -> AppResult<Vec<A07Entry>> {
        Ok(self
            .periods
            .get(period)
            .map(|data| data.a07.clone())
            .unwrap_or_default())
    }

    fn mapping_rules(&self, client_id: ClientId) -> AppResult<Vec<MappingRule>> {
        Ok(self.rules.get(&client_id).cloned().unwrap_or_default())
    }

    fn annotations(&self, period: &PeriodKey) -> AppResult<BTreeMap<String, CodeAnnotation>> {
        let annotations = self.annotations.read().map_err(|_| poisoned())?;
        Ok(annotations.get(period).cloned().unwrap_or_default())
    }

    fn save_annotations(
        &self,
        period: &PeriodKey,
        annotations: &BTreeMap<String, CodeAnnotation>,
    ) -> AppResult<()> {
        let mut stored = self.annotations.write().map_err(|_| poisoned())?;
        stored.insert(*period, annotations.clone());
        Ok(())
    }
}
