//! Reconciliation engine.
//!
//! Trial-balance rows are folded into per-code totals. The fold is
//! associative, so the parallel run splits the rows across rayon workers and
//! merges the partial totals in input order.
//!
//! Amounts are admitted up front against a running total of their absolute
//! values; an amount that would overflow that total counts as zero. Every
//! per-code sum, partial merge and difference therefore stays in range.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::review::{ReviewStatus, effective_status};
use super::types::{
    A07Entry, AccountDetail, AmountRole, CodeAnnotation, DetailSource, ManualAdjustment, MappingRule,
    ReconciliationCode, ReconciliationRun, ReconciliationWarning, TrialBalanceEntry,
    UnmappedAccount,
};
use super::variance::classify_variance;

/// Stateless engine for payroll reconciliation runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

/// Winning rule for one account.
#[derive(Debug, Clone, Copy)]
struct Route<'a> {
    code: &'a str,
    role: AmountRole,
    confidence: Decimal,
}

#[derive(Debug, Default)]
struct CodeTotals {
    a: Decimal,
    b: Decimal,
    c: Decimal,
    accounts: BTreeSet<String>,
    details: Vec<AccountDetail>,
}

impl CodeTotals {
    fn add(&mut self, entry: &TrialBalanceEntry, balance: Decimal, role: AmountRole) {
        match role {
            AmountRole::A => self.a += balance,
            AmountRole::B => self.b += balance,
            AmountRole::C => self.c += balance,
        }
        self.accounts.insert(entry.account.clone());
        self.details.push(AccountDetail {
            account: entry.account.clone(),
            name: entry.name.clone(),
            amount: balance,
            source: DetailSource::TrialBalance,
            role: Some(role),
        });
    }

    fn merge(&mut self, other: Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
        self.accounts.extend(other.accounts);
        self.details.extend(other.details);
    }
}

/// Partial result of folding trial-balance rows.
#[derive(Debug, Default)]
struct LedgerTotals {
    codes: BTreeMap<String, CodeTotals>,
    unmapped: Vec<UnmappedAccount>,
    warnings: Vec<ReconciliationWarning>,
}

impl LedgerTotals {
    fn absorb(
        mut self,
        entry: &TrialBalanceEntry,
        balance: Decimal,
        routes: &BTreeMap<&str, Route<'_>>,
    ) -> Self {
        match routes.get(entry.account.as_str()) {
            Some(route) => self
                .codes
                .entry(route.code.to_string())
                .or_default()
                .add(entry, balance, route.role),
            None => {
                self.warnings.push(ReconciliationWarning::UnmappedAccount {
                    account: entry.account.clone(),
                });
                self.unmapped.push(UnmappedAccount {
                    account: entry.account.clone(),
                    name: entry.name.clone(),
                    balance,
                });
            }
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        for (code, totals) in other.codes {
            self.codes.entry(code).or_default().merge(totals);
        }
        self.unmapped.extend(other.unmapped);
        self.warnings.extend(other.warnings);
        self
    }
}

/// Running absolute total of the amounts admitted into one run.
#[derive(Debug, Default)]
struct AmountGate {
    magnitude: Decimal,
}

impl AmountGate {
    /// Returns the amount, or zero with a warning when it is missing or
    /// would overflow the running total.
    fn admit(
        &mut self,
        amount: Option<Decimal>,
        source: DetailSource,
        reference: &str,
        warnings: &mut Vec<ReconciliationWarning>,
    ) -> Decimal {
        let admitted = amount.and_then(|value| {
            let total = self.magnitude.checked_add(value.abs())?;
            self.magnitude = total;
            Some(value)
        });
        admitted.unwrap_or_else(|| {
            warnings.push(ReconciliationWarning::NumericAnomaly {
                source,
                reference: reference.to_string(),
            });
            Decimal::ZERO
        })
    }
}

/// Admitted trial-balance balances and A07 amounts, in input order.
fn admit_amounts(
    a07: &[A07Entry],
    trial_balance: &[TrialBalanceEntry],
    warnings: &mut Vec<ReconciliationWarning>,
) -> (Vec<Decimal>, Vec<Decimal>) {
    let mut gate = AmountGate::default();
    let balances: Vec<Decimal> = trial_balance
        .iter()
        .map(|entry| {
            gate.admit(
                entry.balance,
                DetailSource::TrialBalance,
                &entry.account,
                warnings,
            )
        })
        .collect();
    let declared: Vec<Decimal> = a07
        .iter()
        .map(|entry| gate.admit(entry.amount, DetailSource::A07, &entry.code, warnings))
        .collect();
    (balances, declared)
}

#[derive(Debug, Default)]
struct DeclaredTotals {
    description: String,
    amount: Decimal,
    details: Vec<AccountDetail>,
}

impl ReconciliationEngine {
    /// Runs a reconciliation with per-code annotations applied.
    ///
    /// Never fails: missing or out-of-range amounts count as zero and data
    /// gaps become warnings. When both the declaration and the trial balance are empty the
    /// run is empty.
    #[must_use]
    pub fn compute(
        a07: &[A07Entry],
        trial_balance: &[TrialBalanceEntry],
        rules: &[MappingRule],
        annotations: &BTreeMap<String, CodeAnnotation>,
    ) -> ReconciliationRun {
        if a07.is_empty() && trial_balance.is_empty() {
            return ReconciliationRun::default();
        }
        let mut warnings = Vec::new();
        let routes = resolve_routes(rules, &mut warnings);
        let (balances, declared) = admit_amounts(a07, trial_balance, &mut warnings);
        let ledger = trial_balance
            .iter()
            .zip(balances)
            .fold(LedgerTotals::default(), |acc, (entry, balance)| {
                acc.absorb(entry, balance, &routes)
            });
        finish(a07, &declared, &routes, ledger, annotations, warnings)
    }

    /// Same as [`Self::compute`], folding the trial balance on the rayon pool.
    ///
    /// Produces output identical to the sequential run.
    #[must_use]
    pub fn compute_parallel(
        a07: &[A07Entry],
        trial_balance: &[TrialBalanceEntry],
        rules: &[MappingRule],
        annotations: &BTreeMap<String, CodeAnnotation>,
    ) -> ReconciliationRun {
        if a07.is_empty() && trial_balance.is_empty() {
            return ReconciliationRun::default();
        }
        let mut warnings = Vec::new();
        let routes = resolve_routes(rules, &mut warnings);
        let (balances, declared) = admit_amounts(a07, trial_balance, &mut warnings);
        let ledger = trial_balance
            .par_iter()
            .zip(balances.par_iter())
            .fold(LedgerTotals::default, |acc, (entry, &balance)| {
                acc.absorb(entry, balance, &routes)
            })
            .reduce(LedgerTotals::default, LedgerTotals::merge);
        finish(a07, &declared, &routes, ledger, annotations, warnings)
    }
}

/// Runs a reconciliation without adjustments or review decisions.
#[must_use]
pub fn compute_reconciliation(
    a07: &[A07Entry],
    trial_balance: &[TrialBalanceEntry],
    rules: &[MappingRule],
) -> ReconciliationRun {
    ReconciliationEngine::compute(a07, trial_balance, rules, &BTreeMap::new())
}

/// One route per account: the highest-confidence valid rule, first wins ties.
fn resolve_routes<'a>(
    rules: &'a [MappingRule],
    warnings: &mut Vec<ReconciliationWarning>,
) -> BTreeMap<&'a str, Route<'a>> {
    let mut routes: BTreeMap<&str, Route<'_>> = BTreeMap::new();
    for rule in rules {
        if !rule.has_valid_confidence() {
            warnings.push(ReconciliationWarning::RuleIgnored {
                source_account: rule.source_account.clone(),
                target_code: rule.target_code.clone(),
                confidence: rule.confidence,
            });
            continue;
        }
        let candidate = Route {
            code: &rule.target_code,
            role: rule.role,
            confidence: rule.confidence,
        };
        routes
            .entry(rule.source_account.as_str())
            .and_modify(|current| {
                if candidate.confidence > current.confidence {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }
    routes
}

fn declared_totals(a07: &[A07Entry], amounts: &[Decimal]) -> BTreeMap<String, DeclaredTotals> {
    let mut declared: BTreeMap<String, DeclaredTotals> = BTreeMap::new();
    for (entry, &amount) in a07.iter().zip(amounts) {
        let totals = declared.entry(entry.code.clone()).or_default();
        if totals.description.is_empty() {
            totals.description.clone_from(&entry.description);
        }
        totals.amount += amount;
        totals.details.push(AccountDetail {
            account: entry.code.clone(),
            name: entry.description.clone(),
            amount,
            source: DetailSource::A07,
            role: None,
        });
    }
    declared
}

fn finish(
    a07: &[A07Entry],
    declared_amounts: &[Decimal],
    routes: &BTreeMap<&str, Route<'_>>,
    ledger: LedgerTotals,
    annotations: &BTreeMap<String, CodeAnnotation>,
    mut warnings: Vec<ReconciliationWarning>,
) -> ReconciliationRun {
    warnings.extend(ledger.warnings);
    let mut declared = declared_totals(a07, declared_amounts);
    let mut ledger_codes = ledger.codes;

    let mut all_codes: BTreeSet<String> = routes.values().map(|r| r.code.to_string()).collect();
    all_codes.extend(declared.keys().cloned());

    let mut codes = Vec::with_capacity(all_codes.len());
    for code in all_codes {
        let totals = ledger_codes.remove(&code).unwrap_or_default();
        let reported = declared.remove(&code);
        if reported.is_some() && totals.accounts.is_empty() {
            warnings.push(ReconciliationWarning::MissingLedgerActivity { code: code.clone() });
        }
        let annotation = annotations.get(&code);
        codes.push(build_record(code, totals, reported, annotation, &mut warnings));
    }

    for warning in &warnings {
        warn!(?warning, "Reconciliation data gap");
    }
    debug!(
        codes = codes.len(),
        unmapped = ledger.unmapped.len(),
        warnings = warnings.len(),
        "Reconciliation computed"
    );

    ReconciliationRun {
        codes,
        unmapped: ledger.unmapped,
        warnings,
    }
}

fn build_record(
    code: String,
    totals: CodeTotals,
    reported: Option<DeclaredTotals>,
    annotation: Option<&CodeAnnotation>,
    warnings: &mut Vec<ReconciliationWarning>,
) -> ReconciliationCode {
    let reported = reported.unwrap_or_default();
    let d = totals.a + totals.b - totals.c;

    let adjustment = annotation.and_then(|a| a.adjustment.as_ref()).map(|raw| {
        let (adjustment, changed) = raw.clamped();
        if changed {
            warnings.push(ReconciliationWarning::AdjustmentClamped { code: code.clone() });
        }
        adjustment
    });
    // Admitted amounts keep D and D - amelding in range; an adjustment that
    // would push E or the difference out of range is not applied.
    let net = adjustment.as_ref().map_or(Decimal::ZERO, ManualAdjustment::net);
    let (e, difference) = d
        .checked_add(net)
        .and_then(|e| Some((e, e.checked_sub(reported.amount)?)))
        .unwrap_or_else(|| {
            warnings.push(ReconciliationWarning::NumericAnomaly {
                source: DetailSource::Rule,
                reference: code.clone(),
            });
            (d, d - reported.amount)
        });
    let status = classify_variance(difference);
    let review = effective_status(status, annotation.and_then(|a| a.review.as_ref()));

    let mut details = totals.details;
    details.extend(reported.details);
    if let Some(adj) = adjustment.as_ref().filter(|adj| !adj.is_zero()) {
        details.push(AccountDetail {
            account: code.clone(),
            name: adj.note.clone(),
            amount: adj.net(),
            source: DetailSource::Rule,
            role: None,
        });
    }

    let description = if reported.description.is_empty() {
        code.clone()
    } else {
        reported.description
    };

    ReconciliationCode {
        description,
        accounts: totals.accounts.into_iter().collect(),
        a: totals.a,
        b: totals.b,
        c: totals.c,
        d,
        e,
        amelding: reported.amount,
        difference,
        status,
        review,
        resolved: review == ReviewStatus::Accepted,
        adjustment,
        notes: annotation.and_then(|a| a.note.clone()),
        details,
        code,
    }
}
