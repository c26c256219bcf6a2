// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Heading-matched rate tables in server-rendered markup.
//!
//! Credit-union and government-style rate pages publish several tables on
//! one page (conventional, jumbo, VA ...). Only the table introduced by a
//! heading containing the target phrase is read. Two layouts are accepted:
//!
//! - a `div.ratesTable` container whose `h2`/`h3` carries the phrase;
//! - a bare `table` whose preceding sibling element is (or contains) such a
//!   heading.
//!
//! Each body row contributes one header cell (loan type) followed by the
//! first three data cells: rate, points, APR.

use crate::extract::RawQuote;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// One row of a heading-matched table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuote {
    pub loan_type: String,
    pub interest_rate: String,
    pub points: String,
    pub apr: String,
}

impl From<TableQuote> for RawQuote {
    fn from(q: TableQuote) -> Self {
        RawQuote {
            product_name: q.loan_type,
            interest_rate: q.interest_rate,
            apr: q.apr,
            points: q.points,
        }
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

fn clean_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn heading_matches(el: ElementRef<'_>, phrase: &str) -> bool {
    clean_text(el).to_lowercase().contains(&phrase.to_lowercase())
}

/// `el` is a matching heading, or contains one.
fn has_matching_heading(el: ElementRef<'_>, headings: &Selector, phrase: &str) -> bool {
    let name = el.value().name();
    if (name == "h2" || name == "h3") && heading_matches(el, phrase) {
        return true;
    }
    el.select(headings).any(|h| heading_matches(h, phrase))
}

fn read_rows(table: ElementRef<'_>, out: &mut Vec<TableQuote>) {
    let rows = selector("tbody tr");
    let th = selector("th");
    let td = selector("td");

    for row in table.select(&rows) {
        let Some(header) = row.select(&th).next() else {
            continue;
        };
        let cells: Vec<ElementRef<'_>> = row.select(&td).collect();
        if cells.len() < 3 {
            continue;
        }
        out.push(TableQuote {
            loan_type: clean_text(header),
            interest_rate: clean_text(cells[0]),
            points: clean_text(cells[1]),
            apr: clean_text(cells[2]),
        });
    }
}

/// Extract every row of every table introduced by `heading_phrase`
/// (case-insensitive). Returns an empty list when nothing matches.
pub fn extract_caption_tables(html: &str, heading_phrase: &str) -> Vec<TableQuote> {
    let document = Html::parse_document(html);
    let containers = selector("div.ratesTable");
    let headings = selector("h2, h3");
    let tables = selector("table");

    let mut seen = HashSet::new();
    let mut quotes = Vec::new();

    for container in document.select(&containers) {
        let Some(heading) = container.select(&headings).next() else {
            continue;
        };
        if !heading_matches(heading, heading_phrase) {
            continue;
        }
        for table in container.select(&tables) {
            if seen.insert(table.id()) {
                read_rows(table, &mut quotes);
            }
        }
    }

    for table in document.select(&tables) {
        if seen.contains(&table.id()) {
            continue;
        }
        let previous = table.prev_siblings().find_map(ElementRef::wrap);
        if let Some(prev) = previous {
            if has_matching_heading(prev, &headings, heading_phrase) {
                seen.insert(table.id());
                read_rows(table, &mut quotes);
            }
        }
    }

    tracing::debug!(
        heading = heading_phrase,
        tables = seen.len(),
        rows = quotes.len(),
        "caption table extraction"
    );
    quotes
}
