// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Raw extraction output and the selection filter applied to it.
//!
//! Every strategy (literal table, static DOM scrape, scripted browser)
//! produces [`RawQuote`]s in the institution's own vocabulary. They become
//! [`BankRate`]s only after normalization and the opt-in filter.

pub mod tables;

use crate::model::{BankRate, Institution};
use crate::normalize::NormalizeTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use tables::{table_quotes, TableRow};

/// An extracted (product, rate, APR, points) tuple, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    pub product_name: String,
    pub interest_rate: String,
    pub apr: String,
    pub points: String,
}

/// Normalize product names and keep only the institution's selected types.
///
/// Filtering runs after normalization, so a selection made against the
/// canonical vocabulary matches however the site spelled the product.
pub fn select_quotes(
    institution: &Institution,
    table: &NormalizeTable,
    raw: Vec<RawQuote>,
    fetched_at: DateTime<Utc>,
) -> Vec<BankRate> {
    let mut selected = Vec::new();
    for quote in raw {
        let mortgage_type = table.map(&quote.product_name);
        if !institution.is_selected(mortgage_type) {
            tracing::trace!(
                institution = %institution.name,
                product = %quote.product_name,
                mortgage_type,
                "skipping unselected mortgage type"
            );
            continue;
        }
        selected.push(BankRate {
            bank_name: institution.name.clone(),
            mortgage_type: mortgage_type.to_string(),
            interest_rate: quote.interest_rate,
            apr: quote.apr,
            points: quote.points,
            fetch_date: fetched_at,
        });
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> RawQuote {
        RawQuote {
            product_name: name.to_string(),
            interest_rate: "6.375%".to_string(),
            apr: "6.540%".to_string(),
            points: "$3,200".to_string(),
        }
    }

    fn wells_fargo() -> Institution {
        Institution::new(
            "Wells Fargo",
            "https://www.wellsfargo.com/mortgage/rates/",
            vec![
                "15-year Fixed".to_string(),
                "30-year Fixed".to_string(),
                "30-year Fixed VA".to_string(),
            ],
            vec![],
        )
    }

    #[test]
    fn test_only_selected_types_survive() {
        let mut inst = wells_fargo();
        inst.select("30-year Fixed");
        let quotes = select_quotes(
            &inst,
            &NormalizeTable::EMPTY,
            vec![raw("30-year Fixed"), raw("15-year Fixed")],
            Utc::now(),
        );
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].mortgage_type, "30-year Fixed");
        assert_eq!(quotes[0].bank_name, "Wells Fargo");
        assert_eq!(quotes[0].points, "$3,200");
    }

    #[test]
    fn test_filter_applies_to_normalized_name() {
        const TABLE: NormalizeTable = NormalizeTable::new(&[("30-Year Fixed Rate", "30-year Fixed")]);
        let mut inst = wells_fargo();
        inst.select("30-year Fixed");
        let quotes = select_quotes(&inst, &TABLE, vec![raw("30-Year Fixed Rate")], Utc::now());
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].mortgage_type, "30-year Fixed");
    }

    #[test]
    fn test_nothing_selected_yields_nothing() {
        let inst = wells_fargo();
        let quotes = select_quotes(&inst, &NormalizeTable::EMPTY, vec![raw("30-year Fixed")], Utc::now());
        assert!(quotes.is_empty());
    }
}
