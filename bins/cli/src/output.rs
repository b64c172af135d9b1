//! Rendering of command results.

use std::fmt::Write as _;

use auditdesk_core::currency::format_as_currency;
use auditdesk_core::reconciliation::{ReconciliationRun, ReconciliationSummary};
use auditdesk_core::sampling::SampleSession;
use auditdesk_shared::config::DisplayConfig;
use serde::Serialize;

/// Pretty JSON for stdout.
pub fn json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Run and summary as one JSON document.
#[derive(Debug, Serialize)]
pub struct ReconciliationReport<'a> {
    /// Totals across codes.
    pub summary: ReconciliationSummary,
    /// Full run, omitted for summary-only output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<&'a ReconciliationRun>,
}

/// Text table of a reconciliation run.
#[must_use]
pub fn reconciliation_text(run: &ReconciliationRun, display: &DisplayConfig) -> String {
    let money = |amount| format_as_currency(amount, display.currency, display.locale);
    let mut out = String::new();
    for record in &run.codes {
        let _ = writeln!(
            out,
            "{:<8} {:<28} D {:>18}  A-melding {:>18}  diff {:>16}  {:<5} {}",
            record.code,
            record.description,
            money(record.e),
            money(record.amelding),
            money(record.difference),
            record.status,
            record.review,
        );
    }
    for account in &run.unmapped {
        let _ = writeln!(
            out,
            "unmapped {:<8} {:<28} {:>18}",
            account.account,
            account.name,
            money(account.balance)
        );
    }
    let summary = ReconciliationSummary::from_run(run);
    let _ = writeln!(
        out,
        "{} codes: {} match, {} minor, {} major, {} unresolved; total difference {}",
        summary.code_count,
        summary.match_count,
        summary.minor_count,
        summary.major_count,
        summary.unresolved_count,
        money(summary.total_difference),
    );
    if summary.is_fully_resolved() {
        out.push_str("all codes resolved\n");
    }
    out
}

/// Text listing of a sampling session.
#[must_use]
pub fn session_text(session: &SampleSession, display: &DisplayConfig) -> String {
    let money = |amount| format_as_currency(amount, display.currency, display.locale);
    let summary = &session.result.summary;
    let mut out = String::new();
    for tx in &session.result.sample {
        let mark = if session.tested.contains(&tx.id) { "x" } else { " " };
        let _ = writeln!(
            out,
            "[{mark}] {:<12} {:<6} {:<32} {:>18}",
            tx.id,
            tx.account_number,
            tx.description,
            money(tx.amount())
        );
    }
    let _ = writeln!(
        out,
        "{}: {} of {} items, {} of {} ({}%)",
        summary.method,
        summary.sampled_count,
        summary.total_count,
        money(summary.sampled_amount),
        money(summary.total_amount),
        summary.coverage_percent,
    );
    let _ = writeln!(
        out,
        "tested {} of {}{}",
        session.tested_count(),
        summary.sampled_count,
        if session.is_complete() { ", complete" } else { "" },
    );
    if let Some(seed) = session.seed {
        let _ = writeln!(out, "seed {seed}");
    }
    out
}
