//! Command-line arguments.

use std::path::PathBuf;

use auditdesk_core::currency::parse_amount;
use auditdesk_core::ports::{PeriodKey, TransactionQuery};
use auditdesk_core::reconciliation::ReviewAction;
use auditdesk_core::sampling::SamplingConfiguration;
use auditdesk_shared::config::DisplayConfig;
use auditdesk_shared::types::{ClientId, Currency, LedgerVersionId, Locale, UserId};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(
    name = "auditdesk",
    version,
    about = "Audit sampling and payroll reconciliation"
)]
pub struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    /// Currency of text output (NOK, SEK, DKK, EUR, USD).
    #[arg(long, global = true)]
    pub currency: Option<Currency>,

    /// Locale of text output (nb-NO, en-US).
    #[arg(long, global = true)]
    pub locale: Option<Locale>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Display settings with the command-line overrides applied.
    #[must_use]
    pub fn display(&self, configured: &DisplayConfig) -> DisplayConfig {
        DisplayConfig {
            currency: self.currency.unwrap_or(configured.currency),
            locale: self.locale.unwrap_or(configured.locale),
        }
    }
}

/// Output rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Human-readable table with localized amounts.
    Text,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Draw a sample from a JSON input file or a stored period.
    Sample(SampleArgs),
    /// Reconcile A07 against the trial balance.
    Reconcile(ReconcileArgs),
    /// Store a manual adjustment for a code.
    Adjust {
        #[command(flatten)]
        period: PeriodArgs,
        /// Payroll code.
        #[arg(long)]
        code: String,
        /// Amount added to D.
        #[arg(long, value_parser = parse_decimal, default_value = "0")]
        addition: Decimal,
        /// Amount subtracted from D.
        #[arg(long, value_parser = parse_decimal, default_value = "0")]
        deduction: Decimal,
        /// Reason for the adjustment.
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Remove the manual adjustment of a code.
    ClearAdjustment {
        #[command(flatten)]
        period: PeriodArgs,
        /// Payroll code.
        #[arg(long)]
        code: String,
    },
    /// Set or clear the reviewer note of a code.
    Note {
        #[command(flatten)]
        period: PeriodArgs,
        /// Payroll code.
        #[arg(long)]
        code: String,
        /// Note text; omit to clear.
        #[arg(long)]
        text: Option<String>,
    },
    /// Accept, reject or reopen a code.
    Review(ReviewArgs),
    /// Mark a sampled transaction as tested.
    MarkTested {
        /// Session key.
        #[arg(long)]
        session: String,
        /// Transaction id.
        #[arg(long = "transaction")]
        transaction_id: String,
    },
}

/// Client and fiscal year of stored data.
#[derive(Debug, Clone, Args)]
pub struct PeriodArgs {
    /// Client id (UUID).
    #[arg(long)]
    pub client: ClientId,
    /// Fiscal year.
    #[arg(long)]
    pub year: i32,
}

impl PeriodArgs {
    /// Period key for the ports.
    #[must_use]
    pub const fn key(&self) -> PeriodKey {
        PeriodKey::new(self.client, self.year)
    }
}

/// Arguments of `sample`.
#[derive(Debug, Args)]
pub struct SampleArgs {
    /// JSON file with `transactions`, `config` and optional `seed`.
    #[arg(long, conflicts_with_all = ["client", "year", "method"])]
    pub input: Option<PathBuf>,

    /// Client id of stored data.
    #[arg(long, requires = "year")]
    pub client: Option<ClientId>,
    /// Fiscal year of stored data.
    #[arg(long, requires = "client")]
    pub year: Option<i32>,
    /// Lowest account number.
    #[arg(long)]
    pub from_account: Option<String>,
    /// Highest account number.
    #[arg(long)]
    pub to_account: Option<String>,
    /// Imported ledger version to sample instead of the current ledger.
    #[arg(long, requires = "client")]
    pub ledger_version: Option<LedgerVersionId>,

    /// Sampling method for stored data.
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
    /// Items to draw (simple random).
    #[arg(long)]
    pub sample_size: Option<usize>,
    /// Coverage target percent (stratified).
    #[arg(long, value_parser = parse_decimal)]
    pub coverage: Option<Decimal>,
    /// Key-item threshold (monetary unit).
    #[arg(long, value_parser = parse_decimal)]
    pub threshold: Option<Decimal>,

    /// Seed override: decimal u64 or 0x-hex.
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,
    /// Persist the result as a session under this key.
    #[arg(long)]
    pub session: Option<String>,
}

impl SampleArgs {
    /// Period of stored data, when selected.
    #[must_use]
    pub fn period(&self) -> Option<PeriodKey> {
        Some(PeriodKey::new(self.client?, self.year?))
    }

    /// Transaction query for stored data.
    #[must_use]
    pub fn query(&self, period: PeriodKey) -> TransactionQuery {
        let query = TransactionQuery::period(period)
            .with_accounts(self.from_account.clone(), self.to_account.clone());
        match self.ledger_version {
            Some(version) => query.with_version(version),
            None => query,
        }
    }

    /// Sampling configuration from the method flags.
    pub fn configuration(&self) -> Result<SamplingConfiguration, String> {
        match self.method {
            Some(MethodArg::SimpleRandom) => Ok(SamplingConfiguration::SimpleRandom {
                sample_size: self.sample_size.ok_or("--sample-size is required")?,
            }),
            Some(MethodArg::Stratified) => Ok(SamplingConfiguration::Stratified {
                coverage_target_percent: self.coverage.ok_or("--coverage is required")?,
            }),
            Some(MethodArg::MonetaryUnit) => Ok(SamplingConfiguration::MonetaryUnit {
                threshold_amount: self.threshold.ok_or("--threshold is required")?,
            }),
            None => Err("--method is required with --client/--year".to_string()),
        }
    }
}

/// Sampling method flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Simple random sampling.
    SimpleRandom,
    /// Stratified coverage sampling.
    Stratified,
    /// Monetary unit sampling.
    MonetaryUnit,
}

/// Arguments of `reconcile`.
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// JSON file with `a07`, `trialBalance`, `mappingRules`, `annotations`.
    #[arg(long, conflicts_with_all = ["client", "year"])]
    pub input: Option<PathBuf>,
    /// Client id of stored data.
    #[arg(long, requires = "year")]
    pub client: Option<ClientId>,
    /// Fiscal year of stored data.
    #[arg(long, requires = "client")]
    pub year: Option<i32>,
    /// Print only the run summary.
    #[arg(long)]
    pub summary_only: bool,
}

impl ReconcileArgs {
    /// Period of stored data, when selected.
    #[must_use]
    pub fn period(&self) -> Option<PeriodKey> {
        Some(PeriodKey::new(self.client?, self.year?))
    }
}

/// Review action flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewVerb {
    /// Approve the difference.
    Accept,
    /// Flag the difference for investigation.
    Reject,
    /// Withdraw the earlier decision.
    Reopen,
}

/// Arguments of `review`.
#[derive(Debug, Args)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub period: PeriodArgs,
    /// Payroll code.
    #[arg(long)]
    pub code: String,
    /// Action to apply.
    #[arg(value_enum)]
    pub action: ReviewVerb,
    /// Comment (accept) or reason (reject).
    #[arg(long)]
    pub comment: Option<String>,
    /// Reviewer id (UUID).
    #[arg(long)]
    pub by: Option<UserId>,
}

impl ReviewArgs {
    /// Review action for the service.
    pub fn action(&self) -> Result<ReviewAction, String> {
        match self.action {
            ReviewVerb::Accept => Ok(ReviewAction::Accept {
                by: self.by,
                comment: self.comment.clone(),
            }),
            ReviewVerb::Reject => Ok(ReviewAction::Reject {
                by: self.by,
                reason: self
                    .comment
                    .clone()
                    .ok_or("--comment with a reason is required to reject")?,
            }),
            ReviewVerb::Reopen => Ok(ReviewAction::Reopen),
        }
    }
}

/// Amount parser accepting `1 234,50`, `1,234.50` and plain numbers.
pub fn parse_decimal(s: &str) -> Result<Decimal, String> {
    parse_amount(s).ok_or_else(|| format!("not an amount: {s}"))
}

/// Seed parser: decimal u64 or 0x-hex (1..=16 digits).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>()
            .map_err(|_| "decimal seed must be a valid u64".into())
    }
}
