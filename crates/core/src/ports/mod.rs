//! Data access and persistence ports.
//!
//! The engines never touch storage. [`crate::service::AuditService`] reads
//! inputs through an [`AuditDataSource`] and keeps sampling sessions in a
//! [`SessionStore`], both injected by the caller.

pub mod file;
pub mod memory;
pub mod types;

use std::collections::BTreeMap;

use auditdesk_shared::AppResult;
use auditdesk_shared::types::ClientId;

use crate::reconciliation::{A07Entry, CodeAnnotation, MappingRule, TrialBalanceEntry};
use crate::sampling::Transaction;

pub use file::{FileSessionStore, JsonFileDataSource};
pub use memory::{MemoryDataSource, MemorySessionStore, PeriodData};
pub use types::{PeriodKey, TransactionQuery};

/// Source of the raw inputs of audit runs.
pub trait AuditDataSource {
    /// Ledger transactions matching the query.
    fn transactions(&self, query: &TransactionQuery) -> AppResult<Vec<Transaction>>;

    /// Closing balances of the period.
    fn trial_balance(&self, period: &PeriodKey) -> AppResult<Vec<TrialBalanceEntry>>;

    /// A07 declaration rows of the period.
    fn a07(&self, period: &PeriodKey) -> AppResult<Vec<A07Entry>>;

    /// Account-to-code rules of the client.
    fn mapping_rules(&self, client_id: ClientId) -> AppResult<Vec<MappingRule>>;

    /// Reviewer annotations of the period, keyed by code.
    fn annotations(&self, period: &PeriodKey) -> AppResult<BTreeMap<String, CodeAnnotation>>;

    /// Replaces the stored annotations of the period.
    fn save_annotations(
        &self,
        period: &PeriodKey,
        annotations: &BTreeMap<String, CodeAnnotation>,
    ) -> AppResult<()>;
}

/// Key-value store for serialized sessions.
pub trait SessionStore {
    /// Returns the stored value, or `None` when the key is unknown.
    fn load(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> AppResult<()>;
}
