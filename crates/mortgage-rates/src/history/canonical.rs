// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Periodic refresh from a single reference rate page.

use super::{HistoryError, HistoryRecord, HistorySink};
use crate::acquisition::http_client::HTML_ACCEPT;
use crate::acquisition::{extract_caption_tables, PageFetcher, TableQuote};
use crate::error::FetchError;
use crate::events::{now_timestamp, EventBus, RateEvent};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use std::sync::Arc;

pub const DEFAULT_SOURCE_URL: &str =
    "https://www.navyfederal.org/loans-cards/mortgage/mortgage-rates.html";
pub const DEFAULT_HEADING: &str = "VA Loan";
/// Eastern Standard Time, where the daily refresh runs.
pub const EST_OFFSET_SECS: i32 = -5 * 3600;

#[derive(thiserror::Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Scrapes the reference page and appends its rows to a history sink.
pub struct CanonicalRefresher {
    pages: Arc<dyn PageFetcher>,
    url: String,
    heading: String,
    headers: Vec<(String, String)>,
    events: Option<Arc<EventBus>>,
}

impl CanonicalRefresher {
    pub fn new(pages: Arc<dyn PageFetcher>, user_agent: &str) -> Self {
        Self {
            pages,
            url: DEFAULT_SOURCE_URL.to_string(),
            heading: DEFAULT_HEADING.to_string(),
            headers: vec![
                ("User-Agent".to_string(), user_agent.to_string()),
                ("Accept".to_string(), HTML_ACCEPT.to_string()),
            ],
            events: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Fetch, scrape and record. Returns the rows that were written.
    pub async fn refresh(&self, sink: &dyn HistorySink) -> Result<Vec<TableQuote>, RefreshError> {
        let page = self.pages.fetch(&self.url, &self.headers).await?;
        let quotes = extract_caption_tables(&page.body, &self.heading);
        if quotes.is_empty() {
            tracing::warn!(url = %self.url, heading = %self.heading, "reference page had no matching rates");
            return Ok(quotes);
        }

        let date = Utc::now();
        let records: Vec<HistoryRecord> = quotes
            .iter()
            .map(|q| HistoryRecord {
                date,
                loan_type: q.loan_type.clone(),
                interest_rate: q.interest_rate.clone(),
                apr: q.apr.clone(),
            })
            .collect();
        let written = sink.append(&records)?;

        tracing::info!(records = written, "history recorded");
        if let Some(bus) = &self.events {
            bus.emit(RateEvent::HistoryRecorded {
                records: written,
                timestamp: now_timestamp(),
            });
        }
        Ok(quotes)
    }
}

/// The first local noon strictly after `now` in `zone`.
pub fn next_noon_after(now: DateTime<Utc>, zone: FixedOffset) -> Option<DateTime<Utc>> {
    let local = now.with_timezone(&zone);
    let noon = local.date_naive().and_hms_opt(12, 0, 0)?;
    let mut next = zone.from_local_datetime(&noon).single()?;
    if next <= local {
        next += Duration::days(1);
    }
    Some(next.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::HtmlDocument;
    use crate::history::SqliteHistory;
    use async_trait::async_trait;

    const PAGE: &str = r#"<html><body>
        <div class="ratesTable">
          <h2>Conventional Fixed Rate</h2>
          <table><tbody>
            <tr><th>30-year</th><td>5.750%</td><td>0.500</td><td>5.889%</td></tr>
          </tbody></table>
        </div>
        <div class="ratesTable">
          <h3>VA Loan Rates</h3>
          <table><tbody>
            <tr><th>15-year VA</th><td>4.875%</td><td>0.500</td><td>5.558%</td></tr>
            <tr><th>30-year VA</th><td>5.375%</td><td>0.500</td><td>5.789%</td></tr>
          </tbody></table>
        </div>
    </body></html>"#;

    struct StaticPage(&'static str);

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, url: &str, _headers: &[(String, String)]) -> Result<HtmlDocument, FetchError> {
            Ok(HtmlDocument {
                url: url.to_string(),
                final_url: url.to_string(),
                status: 200,
                body: self.0.to_string(),
            })
        }
    }

    fn est() -> FixedOffset {
        FixedOffset::east_opt(EST_OFFSET_SECS).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_appends_matching_rows_only() {
        let store = SqliteHistory::open_in_memory().unwrap();
        let refresher = CanonicalRefresher::new(Arc::new(StaticPage(PAGE)), "test-agent");

        let quotes = refresher.refresh(&store).await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(store.count().unwrap(), 2);
        let recent = store.recent(10).unwrap();
        assert!(recent.iter().all(|r| r.loan_type.ends_with("VA")));
        assert!(recent.iter().any(|r| r.apr == "5.789%"));
    }

    #[tokio::test]
    async fn test_refresh_without_match_writes_nothing() {
        let store = SqliteHistory::open_in_memory().unwrap();
        let refresher = CanonicalRefresher::new(Arc::new(StaticPage(PAGE)), "test-agent")
            .with_heading("Jumbo");
        assert!(refresher.refresh(&store).await.unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_next_noon_before_and_after() {
        // 09:00 EST
        let morning = Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap();
        assert_eq!(
            next_noon_after(morning, est()),
            Some(Utc.with_ymd_and_hms(2026, 1, 15, 17, 0, 0).unwrap())
        );

        // 13:00 EST
        let afternoon = Utc.with_ymd_and_hms(2026, 1, 15, 18, 0, 0).unwrap();
        assert_eq!(
            next_noon_after(afternoon, est()),
            Some(Utc.with_ymd_and_hms(2026, 1, 16, 17, 0, 0).unwrap())
        );

        let exactly_noon = Utc.with_ymd_and_hms(2026, 1, 15, 17, 0, 0).unwrap();
        assert_eq!(
            next_noon_after(exactly_noon, est()),
            Some(Utc.with_ymd_and_hms(2026, 1, 16, 17, 0, 0).unwrap())
        );
    }
}
