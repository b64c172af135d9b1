//! File-backed adapters.
//!
//! Layout under the data directory:
//!
//! ```text
//! {client_id}/mapping_rules.json
//! {client_id}/{fiscal_year}/transactions.json
//! {client_id}/{fiscal_year}/transactions-{version}.json
//! {client_id}/{fiscal_year}/trial_balance.json
//! {client_id}/{fiscal_year}/a07.json
//! {client_id}/{fiscal_year}/annotations.json
//! ```
//!
//! A missing file reads as an empty collection.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use auditdesk_shared::types::ClientId;
use auditdesk_shared::{AppError, AppResult};
use tracing::debug;

use super::types::{PeriodKey, TransactionQuery};
use super::{AuditDataSource, SessionStore};
use crate::ingest;
use crate::reconciliation::{A07Entry, CodeAnnotation, MappingRule, TrialBalanceEntry};
use crate::sampling::Transaction;

/// Reads `path`, returning `None` when it does not exist.
fn read_optional(path: &Path) -> AppResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Input file absent, treating as empty");
            Ok(None)
        }
        Err(err) => Err(AppError::Storage(format!("{}: {err}", path.display()))),
    }
}

/// Writes through a temporary file so readers never see a partial document.
fn write_atomic(path: &Path, contents: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Data source reading JSON documents from a directory tree.
#[derive(Debug, Clone)]
pub struct JsonFileDataSource {
    root: PathBuf,
}

impl JsonFileDataSource {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn period_dir(&self, period: &PeriodKey) -> PathBuf {
        self.root
            .join(period.client_id.to_string())
            .join(period.fiscal_year.to_string())
    }

    fn read_rows<T, F>(&self, path: &Path, parse: F) -> AppResult<Vec<T>>
    where
        F: FnOnce(&str) -> Result<Vec<T>, ingest::IngestError>,
    {
        match read_optional(path)? {
            Some(text) => parse(&text).map_err(|err| {
                AppError::Parse(format!("{}: {err}", path.display()))
            }),
            None => Ok(Vec::new()),
        }
    }
}

impl AuditDataSource for JsonFileDataSource {
    fn transactions(&self, query: &TransactionQuery) -> AppResult<Vec<Transaction>> {
        let file = query
            .version
            .map_or_else(|| "transactions.json".to_string(), |v| format!("transactions-{v}.json"));
        let path = self.period_dir(&query.period).join(file);
        let mut rows = self.read_rows(&path, ingest::parse_transactions)?;
        rows.retain(|tx| query.matches(tx));
        Ok(rows)
    }

    fn trial_balance(&self, period: &PeriodKey) -> AppResult<Vec<TrialBalanceEntry>> {
        let path = self.period_dir(period).join("trial_balance.json");
        self.read_rows(&path, ingest::parse_trial_balance)
    }

    fn a07(&self, period: &PeriodKey) -> AppResult<Vec<A07Entry>> {
        let path = self.period_dir(period).join("a07.json");
        self.read_rows(&path, ingest::parse_a07)
    }

    fn mapping_rules(&self, client_id: ClientId) -> AppResult<Vec<MappingRule>> {
        let path = self
            .root
            .join(client_id.to_string())
            .join("mapping_rules.json");
        self.read_rows(&path, ingest::parse_mapping_rules)
    }

    fn annotations(&self, period: &PeriodKey) -> AppResult<BTreeMap<String, CodeAnnotation>> {
        let path = self.period_dir(period).join("annotations.json");
        let Some(text) = read_optional(&path)? else {
            return Ok(BTreeMap::new());
        };
        let value: serde_json::Value = serde_json::from_str(&text)?;
        ingest::parse_annotations(Some(&value))
            .map_err(|err| AppError::Parse(format!("{}: {err}", path.display())))
    }

    fn save_annotations(
        &self,
        period: &PeriodKey,
        annotations: &BTreeMap<String, CodeAnnotation>,
    ) -> AppResult<()> {
        let path = self.period_dir(period).join("annotations.json");
        let json = serde_json::to_string_pretty(annotations)?;
        write_atomic(&path, &json)
    }
}

/// Session store keeping one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(AppError::Validation(format!("Invalid session key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &str) -> AppResult<Option<String>> {
        read_optional(&self.path_for(key)?)
    }

    fn save(&self, key: &str, value: &str) -> AppResult<()> {
        write_atomic(&self.path_for(key)?, value)
    }
}
