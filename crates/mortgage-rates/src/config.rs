// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Institution catalog and tracker settings.
//!
//! The catalog file is JSON: either a bare array of institutions or an
//! object `{ "banks": [...], "settings": {...} }`. Every setting defaults
//! independently, and a few can be overridden from the environment.

use crate::acquisition::http_client::MOBILE_SAFARI_UA;
use crate::model::Institution;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_FRESHNESS_SECS: &str = "MORTGAGE_RATES_FRESHNESS_SECS";
pub const ENV_CHROMIUM_PATH: &str = "MORTGAGE_RATES_CHROMIUM_PATH";

/// The catalog shipped with the crate, used when no file is supplied.
pub const BUNDLED_CATALOG: &str = include_str!("../data/financial_institutions.json");

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("institution {0:?} appears more than once")]
    DuplicateInstitution(String),
}

/// Pipeline timings and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// A snapshot younger than this is served without fetching.
    pub freshness_secs: u64,
    /// Institutions fetched at once.
    pub max_concurrency: usize,
    /// Ceiling for one institution, all stages included.
    pub institution_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    /// Wait after load before touching the DOM.
    pub settle_ms: u64,
    pub script_timeout_ms: u64,
    /// Wait after submit before reading rates.
    pub render_grace_ms: u64,
    pub http_timeout_ms: u64,
    pub user_agent: String,
    pub chromium_path: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            freshness_secs: 300,
            max_concurrency: 8,
            institution_timeout_ms: 45_000,
            navigation_timeout_ms: 20_000,
            settle_ms: 2_000,
            script_timeout_ms: 10_000,
            render_grace_ms: 3_000,
            http_timeout_ms: 15_000,
            user_agent: MOBILE_SAFARI_UA.to_string(),
            chromium_path: None,
        }
    }
}

impl TrackerConfig {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    pub fn institution_timeout(&self) -> Duration {
        Duration::from_millis(self.institution_timeout_ms)
    }

    /// Apply `MORTGAGE_RATES_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Unparseable or
    /// empty values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secs) = lookup(ENV_FRESHNESS_SECS).and_then(|v| v.trim().parse::<u64>().ok()) {
            self.freshness_secs = secs;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH).map(|v| v.trim().to_string()) {
            if !path.is_empty() {
                self.chromium_path = Some(PathBuf::from(path));
            }
        }
        self
    }
}

/// A loaded catalog: institutions in file order plus settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub institutions: Vec<Institution>,
    pub settings: TrackerConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped {
        banks: Vec<Institution>,
        #[serde(default)]
        settings: TrackerConfig,
    },
    Bare(Vec<Institution>),
}

pub fn parse_catalog(json: &str) -> Result<Catalog, CatalogError> {
    let (institutions, settings) = match serde_json::from_str::<CatalogFile>(json)? {
        CatalogFile::Wrapped { banks, settings } => (banks, settings),
        CatalogFile::Bare(banks) => (banks, TrackerConfig::default()),
    };

    let mut seen = HashSet::new();
    for institution in &institutions {
        if !seen.insert(institution.name.as_str()) {
            return Err(CatalogError::DuplicateInstitution(institution.name.clone()));
        }
    }

    tracing::debug!(institutions = institutions.len(), "catalog parsed");
    Ok(Catalog {
        institutions,
        settings,
    })
}

pub fn bundled_catalog() -> Result<Catalog, CatalogError> {
    parse_catalog(BUNDLED_CATALOG)
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&json)
}
