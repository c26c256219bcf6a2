// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Catalog, history and snapshot path resolution.

use mortgage_rates::config::{self, Catalog, CatalogError};
use std::path::{Path, PathBuf};

pub const ENV_CATALOG: &str = "MORTGAGE_RATES_CATALOG";
pub const ENV_DB: &str = "MORTGAGE_RATES_DB";
const LOCAL_CATALOG: &str = "financial_institutions.json";

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Bundled,
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::File(p) => write!(f, "{}", p.display()),
            CatalogSource::Bundled => f.write_str("bundled catalog"),
        }
    }
}

/// Flag, then `MORTGAGE_RATES_CATALOG`, then `./financial_institutions.json`,
/// then the bundled catalog.
pub fn resolve_catalog(explicit: Option<&Path>) -> CatalogSource {
    resolve_catalog_from(explicit, std::env::var(ENV_CATALOG).ok(), Path::new("."))
}

fn resolve_catalog_from(explicit: Option<&Path>, env: Option<String>, cwd: &Path) -> CatalogSource {
    if let Some(path) = explicit {
        return CatalogSource::File(path.to_path_buf());
    }
    if let Some(env_path) = env.filter(|p| !p.trim().is_empty()) {
        return CatalogSource::File(PathBuf::from(env_path));
    }
    let local = cwd.join(LOCAL_CATALOG);
    if local.exists() {
        return CatalogSource::File(local);
    }
    CatalogSource::Bundled
}

pub fn load_catalog(source: &CatalogSource) -> Result<Catalog, CatalogError> {
    match source {
        CatalogSource::File(path) => config::load_catalog(path),
        CatalogSource::Bundled => config::bundled_catalog(),
    }
}

/// Flag, then `MORTGAGE_RATES_DB`, then `~/.mortgage-rates/history.db`.
pub fn resolve_db_path(explicit: Option<&Path>) -> PathBuf {
    resolve_db_from(explicit, std::env::var(ENV_DB).ok())
}

fn resolve_db_from(explicit: Option<&Path>, env: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(env_path) = env.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(env_path);
    }
    data_dir().join("history.db")
}

/// The last published snapshot, kept between runs.
pub fn snapshot_path() -> PathBuf {
    data_dir().join("snapshot.json")
}

fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mortgage-rates")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_resolution_order() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("mine.json");

        assert_eq!(
            resolve_catalog_from(Some(&explicit), Some("/env.json".into()), dir.path()),
            CatalogSource::File(explicit.clone())
        );
        assert_eq!(
            resolve_catalog_from(None, Some("/env.json".into()), dir.path()),
            CatalogSource::File(PathBuf::from("/env.json"))
        );
        assert_eq!(
            resolve_catalog_from(None, None, dir.path()),
            CatalogSource::Bundled
        );

        let local = dir.path().join(LOCAL_CATALOG);
        std::fs::write(&local, "[]").unwrap();
        assert_eq!(
            resolve_catalog_from(None, Some("  ".into()), dir.path()),
            CatalogSource::File(local)
        );
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = load_catalog(&CatalogSource::Bundled).unwrap();
        assert!(catalog.institutions.iter().any(|i| i.name == "Chase"));
    }

    #[test]
    fn test_db_resolution() {
        let explicit = PathBuf::from("/tmp/rates.db");
        assert_eq!(resolve_db_from(Some(&explicit), Some("/env.db".into())), explicit);
        assert_eq!(resolve_db_from(None, Some("/env.db".into())), PathBuf::from("/env.db"));
        assert!(resolve_db_from(None, None).ends_with(".mortgage-rates/history.db"));
    }
}
