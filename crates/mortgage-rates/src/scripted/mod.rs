// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dynamic page fetcher for calculator-driven rate pages.
//!
//! A scripted fetch is a strict sequence of stages, each with its own
//! deadline: load the page, let client scripts settle, fill the form and
//! submit, then read the re-rendered rows. The browser context is always
//! closed, whether the sequence completes, fails or is cancelled.

pub mod profiles;
pub mod scripts;

pub use profiles::{ExtractShape, FormProfile};

use crate::config::TrackerConfig;
use crate::error::FetchError;
use crate::extract::{select_quotes, RawQuote};
use crate::model::{BankRate, Institution, LoanParameters};
use crate::normalize::NormalizeTable;
use crate::renderer::{ContextGuard, NavigationTimedOut, RenderContext, Renderer};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Per-stage deadlines and waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    pub navigation_timeout: Duration,
    pub settle: Duration,
    pub script_timeout: Duration,
    pub render_grace: Duration,
}

impl Default for StageTiming {
    fn default() -> Self {
        Self::from(&TrackerConfig::default())
    }
}

impl From<&TrackerConfig> for StageTiming {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            settle: Duration::from_millis(config.settle_ms),
            script_timeout: Duration::from_millis(config.script_timeout_ms),
            render_grace: Duration::from_millis(config.render_grace_ms),
        }
    }
}

/// Stages of a scripted fetch, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Settle,
    FillAndSubmit,
    Extract,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Load => Some(Stage::Settle),
            Stage::Settle => Some(Stage::FillAndSubmit),
            Stage::FillAndSubmit => Some(Stage::Extract),
            Stage::Extract => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Settle => "settle",
            Stage::FillAndSubmit => "fill_and_submit",
            Stage::Extract => "extract",
        }
    }
}

/// Drives a [`Renderer`] through the scripted stages.
#[derive(Clone)]
pub struct ScriptedFormFetcher {
    renderer: Arc<dyn Renderer>,
    timing: StageTiming,
}

impl ScriptedFormFetcher {
    pub fn new(renderer: Arc<dyn Renderer>, timing: StageTiming) -> Self {
        Self { renderer, timing }
    }

    /// Run every stage against `url` and return the unnormalized rows.
    pub async fn fetch_raw(
        &self,
        url: &str,
        profile: &FormProfile,
        params: &LoanParameters,
    ) -> Result<Vec<RawQuote>, FetchError> {
        let ctx = self
            .renderer
            .new_context()
            .await
            .map_err(|e| FetchError::Navigation(format!("{e:#}")))?;
        let mut guard = ContextGuard::new(ctx);
        let result = match guard.context_mut() {
            Some(ctx) => self.run_stages(ctx, url, profile, params).await,
            None => Err(FetchError::Navigation("browser context unavailable".to_string())),
        };
        guard.close().await;
        result
    }

    /// Fetch an institution through its calculator form and keep only the
    /// normalized rates it has opted into.
    pub async fn fetch_via_scripted_form(
        &self,
        institution: &Institution,
        profile: &FormProfile,
        table: &NormalizeTable,
        params: &LoanParameters,
    ) -> Result<Vec<BankRate>, FetchError> {
        let raw = self.fetch_raw(&institution.base_url, profile, params).await?;
        Ok(select_quotes(institution, table, raw, Utc::now()))
    }

    async fn run_stages(
        &self,
        ctx: &mut dyn RenderContext,
        url: &str,
        profile: &FormProfile,
        params: &LoanParameters,
    ) -> Result<Vec<RawQuote>, FetchError> {
        let mut stage = Some(Stage::Load);
        let mut quotes = Vec::new();
        while let Some(current) = stage {
            let started = Instant::now();
            match current {
                Stage::Load => self.load(ctx, url).await?,
                Stage::Settle => tokio::time::sleep(self.timing.settle).await,
                Stage::FillAndSubmit => self.fill_and_submit(&*ctx, profile, params).await?,
                Stage::Extract => quotes = self.extract(&*ctx, &profile.extract).await?,
            }
            tracing::debug!(
                url,
                stage = current.as_str(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage complete"
            );
            stage = current.next();
        }
        Ok(quotes)
    }

    async fn load(&self, ctx: &mut dyn RenderContext, url: &str) -> Result<(), FetchError> {
        let limit_ms = self.timing.navigation_timeout.as_millis() as u64;
        match timeout(self.timing.navigation_timeout, ctx.navigate(url, limit_ms)).await {
            Err(_) => Err(FetchError::NavigationTimeout(limit_ms)),
            Ok(Err(e)) => match e.downcast_ref::<NavigationTimedOut>() {
                Some(NavigationTimedOut(ms)) => Err(FetchError::NavigationTimeout(*ms)),
                None => Err(FetchError::Navigation(format!("{e:#}"))),
            },
            Ok(Ok(nav)) => {
                tracing::debug!(final_url = %nav.final_url, load_time_ms = nav.load_time_ms, "page loaded");
                Ok(())
            }
        }
    }

    async fn run_script(
        &self,
        ctx: &dyn RenderContext,
        script: &str,
    ) -> Result<serde_json::Value, FetchError> {
        let limit_ms = self.timing.script_timeout.as_millis() as u64;
        match timeout(self.timing.script_timeout, ctx.execute_js(script)).await {
            Err(_) => Err(FetchError::ScriptExecution(format!(
                "script did not finish within {limit_ms}ms"
            ))),
            Ok(Err(e)) => Err(FetchError::ScriptExecution(format!("{e:#}"))),
            Ok(Ok(value)) => Ok(value),
        }
    }

    async fn fill_and_submit(
        &self,
        ctx: &dyn RenderContext,
        profile: &FormProfile,
        params: &LoanParameters,
    ) -> Result<(), FetchError> {
        let value = self
            .run_script(ctx, &scripts::fill_script(profile, params))
            .await?;
        let report = scripts::parse_fill(value)?;
        if report.filled == 0 {
            return Err(FetchError::FormFieldNotFound(report.missing.join(", ")));
        }
        if !report.missing.is_empty() {
            tracing::debug!(missing = ?report.missing, "some form fields were not found");
        }
        if !report.submitted {
            tracing::debug!("no submit control found; reading rates as rendered");
        }
        Ok(())
    }

    async fn extract(
        &self,
        ctx: &dyn RenderContext,
        shape: &ExtractShape,
    ) -> Result<Vec<RawQuote>, FetchError> {
        tokio::time::sleep(self.timing.render_grace).await;
        let value = self.run_script(ctx, &scripts::extract_script(shape)).await?;
        let quotes = scripts::parse_extract(value)?;
        if quotes.is_empty() {
            if let Ok(html) = ctx.get_html().await {
                tracing::debug!(bytes = html.len(), "no rate rows in rendered page");
            }
        }
        Ok(quotes)
    }
}
