// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Headless Chromium renderer for calculator-driven rate pages.

use super::{NavigationResult, NavigationTimedOut, RenderContext, Renderer};
use crate::config::TrackerConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const INSTALL_DIR: &str = ".mortgage-rates/chromium";

#[cfg(target_os = "macos")]
const INSTALL_LAYOUTS: &[&str] = &[
    "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
    "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
    "chrome",
];
#[cfg(not(target_os = "macos"))]
const INSTALL_LAYOUTS: &[&str] = &["chrome-linux64/chrome", "chrome"];

const SYSTEM_BINARIES: &[&str] = &["google-chrome", "chromium", "chromium-browser"];
const MAC_APP: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";

/// Rate calculators lay out for the phone viewport that matches the default
/// Mobile Safari User-Agent.
const VIEWPORT: (u32, u32) = (390, 844);

/// Look for a browser under `~/.mortgage-rates/chromium`, then on `PATH`,
/// then in the stock macOS install location. An explicit
/// `MORTGAGE_RATES_CHROMIUM_PATH` is handled by [`TrackerConfig`].
pub fn find_chromium() -> Option<PathBuf> {
    let installed = dirs::home_dir().and_then(|home| {
        let dir = home.join(INSTALL_DIR);
        INSTALL_LAYOUTS
            .iter()
            .map(|layout| dir.join(layout))
            .find(|candidate| candidate.exists())
    });

    installed
        .or_else(|| SYSTEM_BINARIES.iter().find_map(|name| which::which(name).ok()))
        .or_else(|| {
            let app = PathBuf::from(MAC_APP);
            (cfg!(target_os = "macos") && app.exists()).then_some(app)
        })
}

/// One shared headless browser; each institution gets its own tab.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    open_tabs: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch headless Chromium with the configured binary and User-Agent.
    pub async fn launch(config: &TrackerConfig) -> Result<Self> {
        let executable = match &config.chromium_path {
            Some(path) => path.clone(),
            None => find_chromium().context(
                "Chromium not found; set MORTGAGE_RATES_CHROMIUM_PATH or install Chrome",
            )?,
        };
        tracing::debug!(executable = %executable.display(), "launching Chromium");

        let browser_config = BrowserConfig::builder()
            .chrome_executable(executable)
            .window_size(VIEWPORT.0, VIEWPORT.1)
            .request_timeout(Duration::from_millis(config.navigation_timeout_ms))
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--user-agent={}", config.user_agent))
            .build()
            .map_err(|e| anyhow::anyhow!("invalid browser config: {e}"))?;

        let (browser, mut events) = Browser::launch(browser_config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::debug!("devtools connection: {e}");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            open_tabs: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .context("failed to open a tab")?;

        self.open_tabs.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(ChromiumTab {
            page,
            open_tabs: Arc::clone(&self.open_tabs),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await.context("failed to close Chromium");
        if closed.is_ok() {
            let _ = browser.wait().await;
        }
        self.handler.abort();
        closed.map(|_| ())
    }

    fn active_contexts(&self) -> usize {
        self.open_tabs.load(Ordering::Relaxed)
    }
}

impl Drop for ChromiumRenderer {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// A single tab.
pub struct ChromiumTab {
    page: Page,
    open_tabs: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumTab {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let started = Instant::now();
        let page = &self.page;

        let loaded = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        match loaded {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(anyhow::anyhow!("navigation to {url} failed: {e}")),
            Err(_) => return Err(NavigationTimedOut(timeout_ms).into()),
        }

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<Value> {
        let evaluated = self
            .page
            .evaluate(script)
            .await
            .context("script evaluation failed")?;
        // `undefined` comes back without a value.
        Ok(evaluated.value().cloned().unwrap_or(Value::Null))
    }

    async fn get_html(&self) -> Result<String> {
        self.page.content().await.context("failed to read page HTML")
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.open_tabs.fetch_sub(1, Ordering::Relaxed);
        if let Err(e) = self.page.close().await {
            tracing::debug!("closing tab failed: {e}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_layouts_are_relative() {
        assert!(INSTALL_LAYOUTS.iter().all(|layout| !layout.starts_with('/')));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_fill_and_read_back_calculator_field() {
        let renderer = ChromiumRenderer::launch(&TrackerConfig::default())
            .await
            .expect("failed to launch Chromium");
        let mut tab = renderer.new_context().await.expect("failed to open tab");
        assert_eq!(renderer.active_contexts(), 1);

        tab.navigate(
            "data:text/html,<input id=price><table><tr><td>Fixed 30 Years</td><td>6.125%</td></tr></table>",
            10_000,
        )
        .await
        .expect("navigation failed");

        let price = tab
            .execute_js("(() => { const el = document.getElementById('price'); el.value = '450000'; return el.value; })()")
            .await
            .expect("fill failed");
        assert_eq!(price, Value::String("450000".to_string()));

        let missing = tab.execute_js("undefined").await.expect("eval failed");
        assert_eq!(missing, Value::Null);

        let html = tab.get_html().await.expect("get_html failed");
        assert!(html.contains("Fixed 30 Years"));

        tab.close().await.expect("close failed");
        assert_eq!(renderer.active_contexts(), 0);
        renderer.shutdown().await.expect("shutdown failed");
    }
}
