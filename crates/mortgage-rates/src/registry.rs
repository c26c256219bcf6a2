// Copyright 2026 Mortgage Rates Contributors
// SPDX-License-Identifier: Apache-2.0

//! Institution name → strategy bundle.
//!
//! A [`Strategy`] says how an institution's rates are acquired (literal
//! table, static page scrape, scripted calculator form) and how its
//! product labels map onto canonical mortgage types. The aggregator
//! resolves each institution once per cycle and never branches on names.

use crate::error::FetchError;
use crate::extract::tables::{self, TableRow};
use crate::model::LoanParameters;
use crate::normalize::{self, NormalizeTable};
use crate::scripted::profiles::{self, FormProfile};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// How the URL of a static page is derived from the catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStyle {
    /// Use `baseUrl` as-is.
    Base,
    /// Replace any query string with the loan parameters.
    LoanQuery,
}

impl UrlStyle {
    pub fn build(&self, base_url: &str, params: &LoanParameters) -> Result<String, FetchError> {
        let mut url = crate::acquisition::http_client::parse_page_url(base_url)?;
        if let UrlStyle::LoanQuery = self {
            url.set_query(None);
            url.query_pairs_mut()
                .append_pair("purchasePrice", &params.purchase_price.to_string())
                .append_pair("downPayment", &params.down_payment.to_string())
                .append_pair("zipcode", &params.zip_code)
                .append_pair("loanType", "mortgage");
        }
        Ok(url.to_string())
    }
}

/// DOM extraction applied to a fetched static page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlExtractor {
    /// The table introduced by a heading containing `heading`.
    CaptionTable { heading: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Hand-maintained rows; no network I/O.
    Table(&'static [TableRow]),
    /// One GET, then DOM extraction.
    StaticPage {
        url: UrlStyle,
        extractor: HtmlExtractor,
    },
    /// Headless browser driving the institution's rate calculator.
    ScriptedForm(FormProfile),
}

impl FetchStrategy {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchStrategy::Table(_) => "table",
            FetchStrategy::StaticPage { .. } => "static_page",
            FetchStrategy::ScriptedForm(_) => "scripted_form",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    pub fetch: FetchStrategy,
    pub normalize: NormalizeTable,
}

impl Strategy {
    pub fn new(fetch: FetchStrategy, normalize: NormalizeTable) -> Self {
        Self { fetch, normalize }
    }

    /// A strategy with identity normalization.
    pub fn fetch_only(fetch: FetchStrategy) -> Self {
        Self::new(fetch, NormalizeTable::EMPTY)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategies for every institution in the bundled catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let tabled: [(&str, &'static [TableRow], NormalizeTable); 6] = [
            ("Charles Schwab", tables::CHARLES_SCHWAB, NormalizeTable::EMPTY),
            ("Citi", tables::CITI, NormalizeTable::EMPTY),
            ("HSBC USA", tables::HSBC_USA, NormalizeTable::EMPTY),
            ("Navy Federal Credit Union", tables::NAVY_FEDERAL, NormalizeTable::EMPTY),
            ("U.S. Bank", tables::US_BANK, NormalizeTable::EMPTY),
            ("Wells Fargo", tables::WELLS_FARGO, normalize::WELLS_FARGO),
        ];
        for (name, rows, table) in tabled {
            registry.register(name, Strategy::new(FetchStrategy::Table(rows), table));
        }
        registry.register(
            "Chase",
            Strategy::new(FetchStrategy::ScriptedForm(profiles::CHASE), normalize::CHASE),
        );
        registry.register(
            "Bank of America",
            Strategy::new(
                FetchStrategy::ScriptedForm(profiles::BANK_OF_AMERICA),
                normalize::BANK_OF_AMERICA,
            ),
        );
        registry
    }

    /// Add a strategy, replacing any previous one for `name`.
    pub fn register(&mut self, name: impl Into<String>, strategy: Strategy) -> &mut Self {
        self.strategies.insert(name.into(), Arc::new(strategy));
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Strategy>, FetchError> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::UnsupportedInstitution(name.to_string()))
    }

    /// Map `raw` through the institution's table. Unregistered institutions
    /// keep their labels unchanged.
    pub fn normalize(&self, institution: &str, raw: &str) -> String {
        match self.strategies.get(institution) {
            Some(strategy) => strategy.normalize.map(raw).to_string(),
            None => raw.to_string(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered institution names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Canonical mortgage type for an institution's raw product label, using
/// the built-in strategies.
pub fn normalize(institution: &str, raw_product_name: &str) -> String {
    static BUILTIN: OnceLock<StrategyRegistry> = OnceLock::new();
    BUILTIN
        .get_or_init(StrategyRegistry::builtin)
        .normalize(institution, raw_product_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_bundled_institutions() {
        let registry = StrategyRegistry::builtin();
        assert_eq!(registry.len(), 8);
        assert_eq!(
            registry.resolve("Chase").unwrap().fetch.kind(),
            "scripted_form"
        );
        assert_eq!(registry.resolve("Citi").unwrap().fetch.kind(), "table");
        assert_eq!(
            registry.resolve("Wells Fargo").unwrap().normalize,
            normalize::WELLS_FARGO
        );
        assert!(registry.resolve("Citi").unwrap().normalize.is_empty());
    }

    #[test]
    fn test_unknown_institution_is_unsupported() {
        let registry = StrategyRegistry::builtin();
        let err = registry.resolve("First Bank of Nowhere").unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedInstitution(ref n) if n == "First Bank of Nowhere"));
        assert!(err.is_soft());
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = StrategyRegistry::builtin();
        registry.register("Citi", Strategy::fetch_only(FetchStrategy::Table(tables::HSBC_USA)));
        assert_eq!(
            registry.resolve("Citi").unwrap().fetch,
            FetchStrategy::Table(tables::HSBC_USA)
        );
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_normalize_uses_registered_table() {
        let mut registry = StrategyRegistry::builtin();
        assert_eq!(registry.normalize("Chase", "30-Year Fixed Rate"), "30-year Fixed");
        assert_eq!(registry.normalize("Citi", "30-Year Fixed Rate"), "30-Year Fixed Rate");
        assert_eq!(registry.normalize("Nowhere Bank", "30 Year Fixed"), "30 Year Fixed");

        registry.register(
            "Citi",
            Strategy::new(FetchStrategy::Table(tables::CITI), normalize::CHASE),
        );
        assert_eq!(registry.normalize("Citi", "30-Year Fixed Rate"), "30-year Fixed");
    }

    #[test]
    fn test_builtin_normalize() {
        assert_eq!(normalize("Wells Fargo", "15-Year Fixed Rate"), "15-year Fixed");
        assert_eq!(
            normalize("Bank of America", "ARM Fixed First 5 Years, Then Adjusts Every 6 Months"),
            "5-year/6-month ARM variable"
        );
        assert_eq!(normalize("Unknown Lender", "30 Year Fixed"), "30 Year Fixed");
    }

    #[test]
    fn test_names_sorted() {
        let registry = StrategyRegistry::builtin();
        let names = registry.names();
        assert_eq!(names.first(), Some(&"Bank of America"));
        assert_eq!(names.last(), Some(&"Wells Fargo"));
    }

    #[test]
    fn test_loan_query_replaces_existing_query() {
        let params = LoanParameters::default();
        let url = UrlStyle::LoanQuery
            .build("https://example.com/rates?old=1", &params)
            .unwrap();
        assert_eq!(
            url,
            "https://example.com/rates?purchasePrice=250000&downPayment=50000&zipcode=95464&loanType=mortgage"
        );
        assert_eq!(
            UrlStyle::Base.build("https://example.com/rates?old=1", &params).unwrap(),
            "https://example.com/rates?old=1"
        );
        assert!(UrlStyle::Base.build("ftp://example.com", &params).is_err());
    }
}
