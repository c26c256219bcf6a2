// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Append-only rate history fed by the canonical-source refresh.
//!
//! The aggregator never reads this store; it only exists so daily rates
//! from one reference source can be charted over time.

pub mod canonical;
pub mod store;

pub use canonical::{next_noon_after, CanonicalRefresher, RefreshError};
pub use store::SqliteHistory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One historical observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub date: DateTime<Utc>,
    pub loan_type: String,
    pub interest_rate: String,
    pub apr: String,
}

#[derive(thiserror::Error, Debug)]
pub enum HistoryError {
    #[error("history database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare history directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored record has an unreadable date {0:?}")]
    BadDate(String),
}

/// Destination for history records.
pub trait HistorySink: Send + Sync {
    /// Append every record; returns how many were written.
    fn append(&self, records: &[HistoryRecord]) -> Result<usize, HistoryError>;
}
