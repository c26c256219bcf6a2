//! End-to-end checks over the bundled catalog and built-in strategies.

use std::sync::Arc;

use async_trait::async_trait;
use mortgage_rates::acquisition::{HtmlDocument, PageFetcher};
use mortgage_rates::config::bundled_catalog;
use mortgage_rates::extract::table_quotes;
use mortgage_rates::{
    normalize, validate, Aggregator, FetchError, FetchStrategy, StrategyRegistry, TrackerConfig,
    ValidationError,
};

struct Offline;

#[async_trait]
impl PageFetcher for Offline {
    async fn fetch(&self, url: &str, _headers: &[(String, String)]) -> Result<HtmlDocument, FetchError> {
        Err(FetchError::Network(format!("offline: {url}")))
    }
}

#[test]
fn bundled_catalog_matches_registry() {
    let catalog = bundled_catalog().unwrap();
    let registry = StrategyRegistry::builtin();

    assert_eq!(catalog.institutions.len(), registry.len());
    for institution in &catalog.institutions {
        assert!(registry.contains(&institution.name), "{} has no strategy", institution.name);
        assert!(!institution.is_opted_in());
        assert!(!institution.mortgage_types.is_empty());
    }
}

#[test]
fn table_products_normalize_into_offered_types() {
    let catalog = bundled_catalog().unwrap();
    let registry = StrategyRegistry::builtin();

    for institution in &catalog.institutions {
        let strategy = registry.resolve(&institution.name).unwrap();
        let FetchStrategy::Table(rows) = &strategy.fetch else {
            continue;
        };
        for quote in table_quotes(rows) {
            let canonical = strategy.normalize.map(&quote.product_name);
            assert!(
                institution.offers(canonical),
                "{}: {canonical:?} is not in mortgageTypes",
                institution.name
            );
        }
    }
}

#[test]
fn wells_fargo_fifteen_year_is_canonical() {
    let catalog = bundled_catalog().unwrap();
    let wells = catalog
        .institutions
        .iter()
        .find(|i| i.name == "Wells Fargo")
        .unwrap();
    let canonical = normalize("Wells Fargo", "15-year Fixed");
    assert!(wells.mortgage_types.contains(&canonical));
    assert_eq!(normalize("Wells Fargo", "40-year Balloon"), "40-year Balloon");
}

#[tokio::test]
async fn user_input_to_snapshot() {
    let params = validate("$400,000", "$80,000", "10001").unwrap();
    assert_eq!(params.loan_amount(), 320_000);

    let mut catalog = bundled_catalog().unwrap();
    for institution in &mut catalog.institutions {
        match institution.name.as_str() {
            "Citi" => institution.set_selected(["30-year fixed"]),
            "Wells Fargo" => institution.select_all(),
            // Scripted institutions are selected but there is no browser.
            "Chase" => institution.set_selected(["30-year Fixed"]),
            _ => {}
        }
    }

    let aggregator = Aggregator::new(
        StrategyRegistry::builtin(),
        Arc::new(Offline),
        TrackerConfig::default(),
    );
    let snapshot = aggregator.aggregate(&catalog.institutions, &params, false).await;

    assert_eq!(
        snapshot.rates.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Citi", "Wells Fargo"]
    );
    assert_eq!(snapshot.rates_for("Citi").len(), 1);
    assert_eq!(snapshot.rates_for("Wells Fargo").len(), 3);
    assert!(snapshot.last_fetch_date.is_some());
}

#[test]
fn invalid_input_never_reaches_the_pipeline() {
    assert!(matches!(
        validate("0", "0", "95464"),
        Err(ValidationError::NonPositivePrice(0))
    ));
    assert!(matches!(
        validate("250000", "50000", "9546"),
        Err(ValidationError::InvalidZip(_))
    ));
    assert!(matches!(
        validate("lots", "50000", "95464"),
        Err(ValidationError::InvalidNumber { .. })
    ));
}
