//! Scraper extraction against saved storefront pages.

use recall::core::ApiError;
use recall::scrape::{parse_listing_links, parse_product, ScrapedRecord};

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("cannot read {}: {}", path, err))
}

#[test]
fn product_page_yields_exactly_the_expected_record() {
    let record = parse_product(&fixture("product.html")).unwrap();
    assert_eq!(
        record,
        ScrapedRecord {
            name: Some("Widget".to_string()),
            price: Some("100".to_string()),
            description: Some("A widget".to_string()),
        }
    );
}

#[test]
fn missing_price_falls_back_to_none() {
    let record = parse_product(&fixture("product_missing_price.html")).unwrap();
    assert_eq!(record.name.as_deref(), Some("Widget"));
    assert_eq!(record.price, None);
    assert_eq!(record.description.as_deref(), Some("A widget"));
}

#[test]
fn fully_unrecognized_page_fails_with_parse_error() {
    let err = parse_product("<html><body><h2>Totally different site</h2></body></html>")
        .unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[test]
fn listing_page_yields_only_product_links() {
    let links =
        parse_listing_links(&fixture("listing.html"), "https://store.example.com/widgets").unwrap();
    assert_eq!(
        links,
        vec![
            "https://store.example.com/widget-1".to_string(),
            "https://store.example.com/widget-2".to_string(),
        ]
    );
}
