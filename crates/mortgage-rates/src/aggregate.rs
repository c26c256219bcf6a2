// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fan-out aggregation across opted-in institutions.
//!
//! One cycle: serve the cached snapshot if it is fresh, otherwise fetch every
//! opted-in institution concurrently (bounded), wait for all of them, and
//! publish one new snapshot. A failing institution contributes nothing and
//! never aborts the cycle.

use crate::acquisition::http_client::HTML_ACCEPT;
use crate::acquisition::{extract_caption_tables, PageFetcher};
use crate::cache::SnapshotCache;
use crate::config::TrackerConfig;
use crate::error::FetchError;
use crate::events::{now_timestamp, EventBus, RateEvent};
use crate::extract::{select_quotes, table_quotes, RawQuote};
use crate::model::{BankRate, Institution, LoanParameters, RateSnapshot};
use crate::registry::{FetchStrategy, HtmlExtractor, Strategy, StrategyRegistry};
use crate::scripted::ScriptedFormFetcher;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

pub struct Aggregator {
    registry: StrategyRegistry,
    pages: Arc<dyn PageFetcher>,
    scripted: Option<ScriptedFormFetcher>,
    config: TrackerConfig,
    headers: Vec<(String, String)>,
    cache: SnapshotCache,
    events: Option<Arc<EventBus>>,
}

impl Aggregator {
    /// An aggregator without a browser; scripted-form institutions fail
    /// with a navigation error until [`Aggregator::with_scripted`] is used.
    pub fn new(registry: StrategyRegistry, pages: Arc<dyn PageFetcher>, config: TrackerConfig) -> Self {
        let headers = vec![
            ("User-Agent".to_string(), config.user_agent.clone()),
            ("Accept".to_string(), HTML_ACCEPT.to_string()),
        ];
        Self {
            registry,
            pages,
            scripted: None,
            config,
            headers,
            cache: SnapshotCache::new(),
            events: None,
        }
    }

    pub fn with_scripted(mut self, fetcher: ScriptedFormFetcher) -> Self {
        self.scripted = Some(fetcher);
        self
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Seed the cache, e.g. with a snapshot restored from disk.
    pub fn with_snapshot(mut self, snapshot: RateSnapshot) -> Self {
        self.cache = SnapshotCache::with_snapshot(snapshot);
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<RateSnapshot> {
        self.cache.current()
    }

    /// Notified whenever a snapshot (or loading marker) is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RateSnapshot>> {
        self.cache.subscribe()
    }

    fn emit(&self, event: RateEvent) {
        if let Some(bus) = &self.events {
            bus.emit(event);
        }
    }

    fn cache_hit(&self) -> Option<Arc<RateSnapshot>> {
        let now = Utc::now();
        let snapshot = self.cache.fresh(now, self.config.freshness_window())?;
        let age_ms = snapshot
            .last_fetch_date
            .and_then(|at| (now - at).to_std().ok())
            .map(|age| age.as_millis() as u64)
            .unwrap_or(0);
        tracing::debug!(age_ms, "serving cached snapshot");
        self.emit(RateEvent::CacheHit { age_ms });
        Some(snapshot)
    }

    /// Fetch rates for every opted-in institution and publish the result.
    ///
    /// Unless `force` is set, a snapshot younger than the freshness window is
    /// returned as-is without any I/O. Dropping the returned future restores
    /// the previous snapshot.
    pub async fn aggregate(
        &self,
        institutions: &[Institution],
        params: &LoanParameters,
        force: bool,
    ) -> Arc<RateSnapshot> {
        if !force {
            if let Some(snapshot) = self.cache_hit() {
                return snapshot;
            }
        }

        let _gate = self.cache.lock_refresh().await;
        // Another caller may have refreshed while we waited.
        if !force {
            if let Some(snapshot) = self.cache_hit() {
                return snapshot;
            }
        }

        let started = Instant::now();
        let mut targets = Vec::with_capacity(institutions.len());
        for institution in institutions {
            if institution.is_opted_in() {
                targets.push(institution);
            } else {
                tracing::debug!(institution = %institution.name, "no mortgage types selected; skipping");
                self.emit(RateEvent::InstitutionSkipped {
                    institution: institution.name.clone(),
                });
            }
        }

        tracing::info!(institutions = targets.len(), force, "refreshing rates");
        self.emit(RateEvent::AggregateStarted {
            institutions: targets.len(),
            forced: force,
            timestamp: now_timestamp(),
        });

        let refresh = self.cache.begin_refresh();
        // One deadline for the whole cycle: an institution queued behind the
        // concurrency limit gets no extra time.
        let deadline = tokio::time::Instant::now() + self.config.institution_timeout();
        let results: Vec<Vec<BankRate>> = stream::iter(targets)
            .map(|institution| self.fetch_institution(institution, params, deadline))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let snapshot = RateSnapshot::from_quotes(results.into_iter().flatten(), Utc::now());
        let institutions = snapshot.rates.len();
        let quotes = snapshot.quote_count();
        let published = refresh.commit(snapshot);

        let total_ms = started.elapsed().as_millis() as u64;
        tracing::info!(institutions, quotes, total_ms, "snapshot published");
        self.emit(RateEvent::SnapshotPublished {
            institutions,
            quotes,
            total_ms,
        });
        published
    }

    /// One institution, start to finish. Never fails: errors become an empty
    /// contribution plus an `InstitutionFailed` event.
    async fn fetch_institution(
        &self,
        institution: &Institution,
        params: &LoanParameters,
        deadline: tokio::time::Instant,
    ) -> Vec<BankRate> {
        let started = Instant::now();

        let result = match self.registry.resolve(&institution.name) {
            Ok(strategy) => {
                match tokio::time::timeout_at(deadline, self.try_fetch(institution, &strategy, params)).await {
                    Ok(result) => result.map(|rates| (strategy.fetch.kind(), rates)),
                    Err(_) => Err(FetchError::Timeout(self.config.institution_timeout_ms)),
                }
            }
            Err(e) => Err(e),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok((strategy, rates)) => {
                tracing::debug!(
                    institution = %institution.name,
                    strategy,
                    quotes = rates.len(),
                    elapsed_ms,
                    "institution fetched"
                );
                self.emit(RateEvent::InstitutionFetched {
                    institution: institution.name.clone(),
                    strategy: strategy.to_string(),
                    quotes: rates.len(),
                    elapsed_ms,
                });
                rates
            }
            Err(e) => {
                if e.is_soft() {
                    tracing::info!(institution = %institution.name, kind = e.kind(), "no rates: {e}");
                } else {
                    tracing::warn!(institution = %institution.name, kind = e.kind(), elapsed_ms, "fetch failed: {e}");
                }
                self.emit(RateEvent::InstitutionFailed {
                    institution: institution.name.clone(),
                    kind: e.kind().to_string(),
                    error: e.to_string(),
                    elapsed_ms,
                });
                Vec::new()
            }
        }
    }

    async fn try_fetch(
        &self,
        institution: &Institution,
        strategy: &Strategy,
        params: &LoanParameters,
    ) -> Result<Vec<BankRate>, FetchError> {
        let raw: Vec<RawQuote> = match &strategy.fetch {
            FetchStrategy::ScriptedForm(profile) => {
                let fetcher = self
                    .scripted
                    .as_ref()
                    .ok_or_else(|| FetchError::Navigation("browser unavailable".to_string()))?;
                return fetcher
                    .fetch_via_scripted_form(institution, profile, &strategy.normalize, params)
                    .await;
            }
            FetchStrategy::Table(rows) => table_quotes(rows),
            FetchStrategy::StaticPage { url, extractor } => {
                let target = url.build(&institution.base_url, params)?;
                let page = self.pages.fetch(&target, &self.headers).await?;
                match extractor {
                    HtmlExtractor::CaptionTable { heading } => extract_caption_tables(&page.body, heading)
                        .into_iter()
                        .map(RawQuote::from)
                        .collect(),
                }
            }
        };
        Ok(select_quotes(institution, &strategy.normalize, raw, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::HtmlDocument;
    use crate::extract::tables;
    use crate::renderer::{NavigationResult, RenderContext, Renderer};
    use crate::scripted::StageTiming;
    use async_trait::async_trait;
    use std::time::Duration;

    struct UnreachableFetcher;

    #[async_trait]
    impl PageFetcher for UnreachableFetcher {
        async fn fetch(&self, url: &str, _headers: &[(String, String)]) -> Result<HtmlDocument, FetchError> {
            Err(FetchError::Network(format!("offline: {url}")))
        }
    }

    fn citi() -> Institution {
        let mut citi = Institution::new(
            "Citi",
            "https://www.citi.com/mortgage/purchase-rates",
            vec!["30-year fixed".to_string(), "15-year fixed".to_string()],
            Vec::new(),
        );
        citi.select("30-year fixed");
        citi
    }

    fn aggregator() -> Aggregator {
        Aggregator::new(
            StrategyRegistry::builtin(),
            Arc::new(UnreachableFetcher),
            TrackerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_table_strategy_filters_to_selection() {
        let agg = aggregator();
        let snapshot = agg.aggregate(&[citi()], &LoanParameters::default(), false).await;
        let rates = snapshot.rates_for("Citi");
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].mortgage_type, "30-year fixed");
        assert_eq!(rates[0].interest_rate, tables::CITI[0].rate);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn test_scripted_without_browser_yields_nothing() {
        let events = Arc::new(EventBus::new(32));
        let mut rx = events.subscribe();
        let agg = aggregator().with_events(Arc::clone(&events));

        let mut chase = Institution::new(
            "Chase",
            "https://www.chase.com/personal/mortgage/mortgage-rates",
            vec!["30-year Fixed".to_string()],
            Vec::new(),
        );
        chase.select_all();

        let snapshot = agg
            .aggregate(&[chase, citi()], &LoanParameters::default(), false)
            .await;
        assert!(snapshot.rates_for("Chase").is_empty());
        assert_eq!(snapshot.rates_for("Citi").len(), 1);

        let mut failed = None;
        while let Ok(event) = rx.try_recv() {
            if let RateEvent::InstitutionFailed { institution, kind, .. } = event {
                failed = Some((institution, kind));
            }
        }
        assert_eq!(failed, Some(("Chase".to_string(), "navigation".to_string())));
    }

    /// A browser whose pages load but every injected script throws.
    struct ThrowingRenderer;
    struct ThrowingContext;

    #[async_trait]
    impl Renderer for ThrowingRenderer {
        async fn new_context(&self) -> anyhow::Result<Box<dyn RenderContext>> {
            Ok(Box::new(ThrowingContext))
        }
        async fn shutdown(&self) -> anyhow::Result<()> {
            Ok(())
        }
        fn active_contexts(&self) -> usize {
            0
        }
    }

    #[async_trait]
    impl RenderContext for ThrowingContext {
        async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> anyhow::Result<NavigationResult> {
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 1,
            })
        }
        async fn execute_js(&self, _script: &str) -> anyhow::Result<serde_json::Value> {
            anyhow::bail!("Uncaught ReferenceError: calculator is not defined")
        }
        async fn get_html(&self) -> anyhow::Result<String> {
            Ok(String::new())
        }
        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_script_failure_is_isolated() {
        let events = Arc::new(EventBus::new(32));
        let mut rx = events.subscribe();
        let timing = StageTiming {
            navigation_timeout: Duration::from_millis(100),
            settle: Duration::ZERO,
            script_timeout: Duration::from_millis(100),
            render_grace: Duration::ZERO,
        };
        let agg = aggregator()
            .with_scripted(ScriptedFormFetcher::new(Arc::new(ThrowingRenderer), timing))
            .with_events(Arc::clone(&events));

        let mut chase = Institution::new(
            "Chase",
            "https://www.chase.com/personal/mortgage/mortgage-rates",
            vec!["30-year Fixed".to_string()],
            Vec::new(),
        );
        chase.select_all();

        let snapshot = agg
            .aggregate(&[chase, citi()], &LoanParameters::default(), false)
            .await;
        assert!(snapshot.rates_for("Chase").is_empty());
        assert_eq!(snapshot.rates_for("Citi").len(), 1);

        let mut failed = None;
        while let Ok(event) = rx.try_recv() {
            if let RateEvent::InstitutionFailed { institution, kind, .. } = event {
                failed = Some((institution, kind));
            }
        }
        assert_eq!(failed, Some(("Chase".to_string(), "script_execution".to_string())));
    }

    #[tokio::test]
    async fn test_unregistered_institution_is_isolated() {
        let agg = aggregator();
        let mut unknown = Institution::new(
            "Credit Union of Elsewhere",
            "https://example.com",
            vec!["30-year fixed".to_string()],
            Vec::new(),
        );
        unknown.select_all();
        let snapshot = agg
            .aggregate(&[unknown, citi()], &LoanParameters::default(), true)
            .await;
        assert_eq!(snapshot.rates.keys().collect::<Vec<_>>(), vec!["Citi"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_published_snapshot() {
        let agg = aggregator();
        let mut rx = agg.subscribe();
        let published = agg.aggregate(&[citi()], &LoanParameters::default(), true).await;
        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert!(Arc::ptr_eq(&seen, &published));
        assert!(Arc::ptr_eq(&agg.snapshot(), &published));
    }
}
