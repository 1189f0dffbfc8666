//! HTML extraction for product and listing pages.
//!
//! Policy for structural drift: a single missing field is tolerated and
//! recorded as `None` with a warning, since storefront markup drifts one
//! field at a time. A product page where no known selector matches at all
//! is a hard `Parse` error, so a silently empty run cannot pass as
//! success.

use scraper::{Html, Selector};
use url::Url;

use super::ScrapedRecord;
use crate::core::errors::ApiError;

struct ProductSelectors {
    name: Selector,
    price: Selector,
    description: Selector,
}

impl ProductSelectors {
    fn new() -> Self {
        Self {
            name: Selector::parse("h1.ui-pdp-title").expect("name selector"),
            price: Selector::parse("span.andes-money-amount__fraction").expect("price selector"),
            description: Selector::parse("p.ui-pdp-description__content")
                .expect("description selector"),
        }
    }
}

/// Extract a product record from a product page.
pub fn parse_product(html: &str) -> Result<ScrapedRecord, ApiError> {
    let selectors = ProductSelectors::new();
    let document = Html::parse_document(html);

    let name = select_text(&document, &selectors.name);
    if name.is_none() {
        tracing::warn!("product name not found");
    }

    // Price fractions carry `.` thousands separators.
    let price = select_text(&document, &selectors.price).map(|text| text.replace('.', ""));
    if price.is_none() {
        tracing::warn!("product price not found");
    }

    let description = select_text(&document, &selectors.description);
    if description.is_none() {
        tracing::warn!("product description not found");
    }

    if name.is_none() && price.is_none() && description.is_none() {
        return Err(ApiError::Parse(
            "no product fields matched; page structure has changed".to_string(),
        ));
    }

    Ok(ScrapedRecord {
        name,
        price,
        description,
    })
}

/// Collect product page links from a listing page, resolved against the
/// listing URL.
pub fn parse_listing_links(html: &str, base_url: &str) -> Result<Vec<String>, ApiError> {
    let selector = Selector::parse("a.poly-component__title").expect("listing link selector");
    let base = Url::parse(base_url)
        .map_err(|err| ApiError::Parse(format!("invalid listing URL {}: {}", base_url, err)))?;

    let document = Html::parse_document(html);
    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        match base.join(href) {
            Ok(resolved) => links.push(resolved.to_string()),
            Err(err) => tracing::warn!("ignoring malformed product link {}: {}", href, err),
        }
    }

    Ok(links)
}

fn select_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(|element| {
        element
            .text()
            .collect::<String>()
            .trim()
            .to_string()
    })
}
