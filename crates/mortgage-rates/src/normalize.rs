// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Product-name normalization: per-institution vocabularies onto the
//! canonical mortgage types used in the catalog.
//!
//! An unmapped name is passed through unchanged so new or renamed products
//! stay visible instead of silently disappearing.

/// A raw → canonical lookup table for one institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeTable {
    entries: &'static [(&'static str, &'static str)],
}

impl NormalizeTable {
    pub const EMPTY: NormalizeTable = NormalizeTable { entries: &[] };

    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Canonical name for `raw`, or `raw` itself when the table has no entry.
    pub fn map<'a>(&self, raw: &'a str) -> &'a str {
        let key = raw.trim();
        self.entries
            .iter()
            .find(|(from, _)| *from == key)
            .map(|(_, to)| *to)
            .unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub const CHASE: NormalizeTable = NormalizeTable::new(&[
    ("30 Year Fixed", "30-year Fixed"),
    ("30-Year Fixed Rate", "30-year Fixed"),
    ("30 Year FHA", "30-year FHA"),
    ("30-Year FHA", "30-year FHA"),
    ("15 Year Fixed", "15-year Fixed"),
    ("15-Year Fixed Rate", "15-year Fixed"),
    ("7/6 ARM", "7/6-month ARM"),
    ("7/6-Month ARM", "7/6-month ARM"),
    ("5/6 ARM", "5/6-month ARM"),
    ("5/6-Month ARM", "5/6-month ARM"),
    ("30 Year Jumbo", "30-year Jumbo"),
    ("30-Year Jumbo", "30-year Jumbo"),
    ("10/6 Interest Only ARM", "10/6 Interest Only Jumbo ARM"),
    ("10/6 IO Jumbo ARM", "10/6 Interest Only Jumbo ARM"),
]);

pub const BANK_OF_AMERICA: NormalizeTable = NormalizeTable::new(&[
    ("Fixed 30 Years", "30-year fixed"),
    ("Fixed 20 Years", "20-year fixed"),
    ("Fixed 15 Years", "15-year fixed"),
    (
        "ARM Fixed First 10 Years, Then Adjusts Every 6 Months",
        "10-year/6-month ARM variable",
    ),
    (
        "ARM Fixed First 7 Years, Then Adjusts Every 6 Months",
        "7-year/6-month ARM variable",
    ),
    (
        "ARM Fixed First 5 Years, Then Adjusts Every 6 Months",
        "5-year/6-month ARM variable",
    ),
]);

pub const WELLS_FARGO: NormalizeTable = NormalizeTable::new(&[
    ("15-Year Fixed Rate", "15-year Fixed"),
    ("15 Year Fixed", "15-year Fixed"),
    ("30-Year Fixed Rate", "30-year Fixed"),
    ("30 Year Fixed", "30-year Fixed"),
    ("30-Year Fixed Rate VA", "30-year Fixed VA"),
    ("30 Year Fixed VA", "30-year Fixed VA"),
]);
