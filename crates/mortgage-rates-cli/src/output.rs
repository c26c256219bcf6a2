// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Plain-text rendering for terminal output.

use mortgage_rates::events::RateEvent;
use mortgage_rates::history::HistoryRecord;
use mortgage_rates::model::{format_currency, format_percentage};
use mortgage_rates::{Institution, LoanParameters, RateSnapshot, StrategyRegistry};
use std::fmt::Write;

pub fn loan_summary(params: &LoanParameters) -> String {
    format!(
        "Purchase price {}  Down payment {} ({})  Loan {}  ZIP {}",
        format_currency(params.purchase_price),
        format_currency(params.down_payment),
        format_percentage(params.down_payment_percentage()),
        format_currency(params.loan_amount()),
        params.zip_code
    )
}

/// One block per institution in snapshot order.
pub fn snapshot_table(snapshot: &RateSnapshot) -> String {
    let mut out = String::new();
    if snapshot.rates.is_empty() {
        out.push_str("No rates returned.\n");
        return out;
    }

    let width = snapshot
        .rates
        .values()
        .flatten()
        .map(|r| r.mortgage_type.chars().count())
        .max()
        .unwrap_or(0)
        .max("Mortgage type".len());

    for (bank, rates) in &snapshot.rates {
        let _ = writeln!(out, "{bank}");
        let _ = writeln!(out, "  {:<width$}  {:>8}  {:>8}  {:>8}", "Mortgage type", "Rate", "APR", "Points");
        for r in rates {
            let _ = writeln!(
                out,
                "  {:<width$}  {:>8}  {:>8}  {:>8}",
                r.mortgage_type, r.interest_rate, r.apr, r.points
            );
        }
        out.push('\n');
    }
    if let Some(at) = snapshot.last_fetch_date {
        let _ = writeln!(out, "Fetched {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    out
}

pub fn catalog_listing(institutions: &[Institution], registry: &StrategyRegistry) -> String {
    let mut out = String::new();
    for institution in institutions {
        let strategy = registry
            .resolve(&institution.name)
            .map(|s| s.fetch.kind())
            .unwrap_or("unsupported");
        let _ = writeln!(out, "{} [{}]", institution.name, strategy);
        let _ = writeln!(out, "  {}", institution.base_url);
        for kind in &institution.mortgage_types {
            let _ = writeln!(out, "  - {kind}");
        }
    }
    out
}

pub fn history_listing(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "No history recorded.\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let _ = writeln!(
            out,
            "{}  {:<28}  {:>8}  {:>8}",
            r.date.format("%Y-%m-%d %H:%M"),
            r.loan_type,
            r.interest_rate,
            r.apr
        );
    }
    out
}

/// One progress line for an acquisition event, if it is worth showing.
pub fn progress_line(event: &RateEvent) -> Option<String> {
    match event {
        RateEvent::InstitutionFetched {
            institution,
            quotes,
            elapsed_ms,
            ..
        } => Some(format!("  ok    {institution}: {quotes} rates ({elapsed_ms}ms)")),
        RateEvent::InstitutionFailed {
            institution,
            error,
            ..
        } => Some(format!("  fail  {institution}: {error}")),
        RateEvent::CacheHit { age_ms } => Some(format!("  using rates fetched {}s ago", age_ms / 1000)),
        _ => None,
    }
}
