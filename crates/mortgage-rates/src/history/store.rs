// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! SQLite-backed history sink.

use super::{HistoryError, HistoryRecord, HistorySink};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only history store.
pub struct SqliteHistory {
    db: Mutex<Connection>,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS rate_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    loan_type TEXT NOT NULL,
    interest_rate TEXT NOT NULL,
    apr TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_rate_records_date ON rate_records(date);";

impl SqliteHistory {
    /// Open or create a history database.
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open the default store at ~/.mortgage-rates/history.db.
    pub fn default_store() -> Result<Self, HistoryError> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| HistoryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Self::open(&path)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mortgage-rates")
            .join("history.db")
    }

    fn init(db: Connection) -> Result<Self, HistoryError> {
        db.execute_batch(SCHEMA)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Poisoning carries no invariant; uncommitted transactions roll back.
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Most recent records first.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let db = self.conn();
        let mut stmt = db.prepare(
            "SELECT date, loan_type, interest_rate, apr FROM rate_records
             ORDER BY date DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(date, loan_type, interest_rate, apr)| -> Result<HistoryRecord, HistoryError> {
                let date = DateTime::parse_from_rfc3339(&date)
                    .map_err(|_| HistoryError::BadDate(date.clone()))?
                    .with_timezone(&Utc);
                Ok(HistoryRecord {
                    date,
                    loan_type,
                    interest_rate,
                    apr,
                })
            })
            .collect()
    }

    pub fn count(&self) -> Result<usize, HistoryError> {
        let n: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM rate_records", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl HistorySink for SqliteHistory {
    fn append(&self, records: &[HistoryRecord]) -> Result<usize, HistoryError> {
        let mut db = self.conn();
        let tx = db.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO rate_records (date, loan_type, interest_rate, apr)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for r in records {
                stmt.execute(rusqlite::params![
                    r.date.to_rfc3339(),
                    r.loan_type,
                    r.interest_rate,
                    r.apr
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(day: u32, loan_type: &str) -> HistoryRecord {
        HistoryRecord {
            date: Utc.with_ymd_and_hms(2026, 3, day, 17, 0, 0).unwrap(),
            loan_type: loan_type.to_string(),
            interest_rate: "5.375%".to_string(),
            apr: "5.789%".to_string(),
        }
    }

    #[test]
    fn test_append_and_recent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteHistory::open(&dir.path().join("history.db")).unwrap();

        assert_eq!(store.append(&[record(1, "15-year VA"), record(2, "30-year VA")]).unwrap(), 2);
        assert_eq!(store.append(&[record(3, "30-year VA")]).unwrap(), 1);
        assert_eq!(store.count().unwrap(), 3);

        let recent = store.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0], record(3, "30-year VA"));
        assert_eq!(recent[1], record(2, "30-year VA"));
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        SqliteHistory::open(&path)
            .unwrap()
            .append(&[record(1, "15-year VA")])
            .unwrap();

        let reopened = SqliteHistory::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
        assert_eq!(reopened.recent(10).unwrap()[0].loan_type, "15-year VA");
    }

    #[test]
    fn test_append_empty_is_noop() {
        let store = SqliteHistory::open_in_memory().unwrap();
        assert_eq!(store.append(&[]).unwrap(), 0);
        assert!(store.recent(5).unwrap().is_empty());
    }
}
