// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scriptable browser surface used by the calculator-form fetcher.
//!
//! The fetcher only needs to open a tab, load a page, run scripts in it and
//! close it again; [`chromium`] provides the real engine and tests plug in
//! fakes.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where a load ended up and how long it took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// After redirects.
    pub final_url: String,
    pub load_time_ms: u64,
}

/// The engine gave up waiting for the navigation-finished signal.
#[derive(Debug, thiserror::Error)]
#[error("navigation timed out after {0}ms")]
pub struct NavigationTimedOut(pub u64);

/// A browser that hands out tabs.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a blank tab.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    async fn shutdown(&self) -> Result<()>;
    /// Tabs opened and not yet closed.
    fn active_contexts(&self) -> usize;
}

/// One tab, owned by one institution's fetch.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL and wait for it to finish loading.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Evaluate a script and return its JSON-converted result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Serialized DOM, for diagnostics.
    async fn get_html(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Owns a context and guarantees it is closed.
///
/// `close` shuts the context down in place. If the guard is dropped first
/// (the owning future was cancelled or hit its deadline) the close is
/// spawned onto the current runtime so the tab is not leaked.
pub struct ContextGuard {
    ctx: Option<Box<dyn RenderContext>>,
}

impl ContextGuard {
    pub fn new(ctx: Box<dyn RenderContext>) -> Self {
        Self { ctx: Some(ctx) }
    }

    pub fn context_mut(&mut self) -> Option<&mut (dyn RenderContext + 'static)> {
        self.ctx.as_deref_mut()
    }

    pub async fn close(mut self) {
        if let Some(ctx) = self.ctx.take() {
            if let Err(e) = ctx.close().await {
                tracing::debug!("closing browser context failed: {e:#}");
            }
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let Some(ctx) = self.ctx.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("browser context abandoned; closing in background");
                handle.spawn(async move {
                    let _ = ctx.close().await;
                });
            }
            Err(_) => tracing::warn!("browser context dropped outside a runtime"),
        }
    }
}
