// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Rate quotes and the aggregated snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One published quote. Rate fields stay as the source printed them
/// ("6.125%", "-", "$3,200" ...); formats vary too much to parse here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankRate {
    pub bank_name: String,
    pub mortgage_type: String,
    pub interest_rate: String,
    pub apr: String,
    pub points: String,
    pub fetch_date: DateTime<Utc>,
}

/// The complete result of one aggregation cycle.
///
/// Snapshots are published behind an `Arc` and replaced wholesale; nothing
/// mutates a published snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshot {
    pub rates: BTreeMap<String, Vec<BankRate>>,
    pub last_fetch_date: Option<DateTime<Utc>>,
    pub is_loading: bool,
}

impl RateSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group quotes by bank, keeping their arrival order within each bank.
    pub fn from_quotes<I>(quotes: I, fetched_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = BankRate>,
    {
        let mut rates: BTreeMap<String, Vec<BankRate>> = BTreeMap::new();
        for quote in quotes {
            rates.entry(quote.bank_name.clone()).or_default().push(quote);
        }
        Self {
            rates,
            last_fetch_date: Some(fetched_at),
            is_loading: false,
        }
    }

    /// Copy of this snapshot carrying a different loading flag.
    pub fn with_loading(&self, is_loading: bool) -> Self {
        Self {
            is_loading,
            ..self.clone()
        }
    }

    pub fn rates_for(&self, bank_name: &str) -> &[BankRate] {
        self.rates.get(bank_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn quote_count(&self) -> usize {
        self.rates.values().map(Vec::len).sum()
    }

    /// `now - last_fetch_date < window`. A never-fetched snapshot is stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let Some(last) = self.last_fetch_date else {
            return false;
        };
        match (now - last).to_std() {
            Ok(age) => age < window,
            // Clock went backwards; treat as just fetched.
            Err(_) => true,
        }
    }
}
