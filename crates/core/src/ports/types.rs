//! Keys used to address stored audit data.

use std::fmt;

use auditdesk_shared::types::{ClientId, LedgerVersionId};
use serde::{Deserialize, Serialize};

use crate::sampling::Transaction;

/// One client's fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Audit client.
    pub client_id: ClientId,
    /// Fiscal year.
    pub fiscal_year: i32,
}

impl PeriodKey {
    /// Creates a period key.
    #[must_use]
    pub const fn new(client_id: ClientId, fiscal_year: i32) -> Self {
        Self {
            client_id,
            fiscal_year,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.client_id, self.fiscal_year)
    }
}

/// Selects the ledger transactions of a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    /// Period to read.
    pub period: PeriodKey,
    /// Ledger version; `None` reads the current ledger.
    #[serde(default)]
    pub version: Option<LedgerVersionId>,
    /// Lowest account number, inclusive.
    #[serde(default)]
    pub account_from: Option<String>,
    /// Highest account number, inclusive.
    #[serde(default)]
    pub account_to: Option<String>,
}

impl TransactionQuery {
    /// Query for every transaction of the current ledger.
    #[must_use]
    pub const fn period(period: PeriodKey) -> Self {
        Self {
            period,
            version: None,
            account_from: None,
            account_to: None,
        }
    }

    /// Restricts the query to an inclusive account range; `None` leaves that
    /// end open.
    #[must_use]
    pub fn with_accounts(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.account_from = from;
        self.account_to = to;
        self
    }

    /// Selects a ledger version.
    #[must_use]
    pub fn with_version(mut self, version: LedgerVersionId) -> Self {
        self.version = Some(version);
        self
    }

    /// True when the transaction falls inside the account range.
    ///
    /// Shorter account numbers order first; numbers of equal length compare
    /// digit by digit.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        let account = tx.account_number.as_str();
        let above = self
            .account_from
            .as_deref()
            .is_none_or(|from| compare_accounts(account, from).is_ge());
        let below = self
            .account_to
            .as_deref()
            .is_none_or(|to| compare_accounts(account, to).is_le());
        above && below
    }
}

fn compare_accounts(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(account: &str) -> Transaction {
        Transaction {
            id: account.to_string(),
            transaction_date: None,
            description: String::new(),
            account_number: account.to_string(),
            net_amount: None,
        }
    }

    #[test]
    fn test_account_range() {
        let query = TransactionQuery::period(PeriodKey::new(ClientId::new(), 2024))
            .with_accounts(Some("5000".into()), Some("5999".into()));
        assert!(query.matches(&tx("5000")));
        assert!(query.matches(&tx("5420")));
        assert!(query.matches(&tx("5999")));
        assert!(!query.matches(&tx("4999")));
        assert!(!query.matches(&tx("6000")));
        assert!(!query.matches(&tx("500")));
        assert!(!query.matches(&tx("50000")));
    }

    #[test]
    fn test_open_ended_range() {
        let query = TransactionQuery::period(PeriodKey::new(ClientId::new(), 2024))
            .with_accounts(Some("5000".into()), None);
        assert!(query.matches(&tx("5000")));
        assert!(query.matches(&tx("99999")));
        assert!(!query.matches(&tx("4999")));
    }

    #[test]
    fn test_unequal_length_accounts_order_by_length() {
        let query = TransactionQuery::period(PeriodKey::new(ClientId::new(), 2024))
            .with_accounts(Some("900".into()), Some("1000".into()));
        assert!(query.matches(&tx("950")));
        assert!(query.matches(&tx("1000")));
        assert!(!query.matches(&tx("2")));
        assert!(!query.matches(&tx("1001")));
    }

    #[test]
    fn test_version_selected() {
        let version = LedgerVersionId::new();
        let query =
            TransactionQuery::period(PeriodKey::new(ClientId::new(), 2024)).with_version(version);
        assert_eq!(query.version, Some(version));
    }

    #[test]
    fn test_open_range() {
        let query = TransactionQuery::period(PeriodKey::new(ClientId::new(), 2024));
        assert!(query.matches(&tx("1920")));
        assert!(query.matches(&tx("")));
    }
}
