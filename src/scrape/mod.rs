//! Product listing scraper.
//!
//! One linear flow: fetch a listing page, collect product links, fetch
//! each product page, extract name/price/description, write the records
//! to a JSON sink. A failing product page is logged and skipped so one
//! dead link does not abort the run.

mod fetch;
mod parse;

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

pub use fetch::PageFetcher;
pub use parse::{parse_listing_links, parse_product};

/// One extracted product record.
///
/// Fields the page no longer exposes come back as `None`; see
/// `parse_product` for the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
}

/// Scrape every product linked from a listing page.
pub async fn scrape_listing(fetcher: &PageFetcher, url: &str) -> Result<Vec<ScrapedRecord>, ApiError> {
    tracing::info!("scraping listing page: {}", url);
    let html = fetcher.fetch(url).await?;
    let links = parse_listing_links(&html, url)?;

    if links.is_empty() {
        tracing::warn!("no product links found on listing page {}", url);
    }

    let mut records = Vec::new();
    for link in links {
        match scrape_product(fetcher, &link).await {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::error!("skipping product page {}: {}", link, err);
            }
        }
    }

    Ok(records)
}

/// Scrape a single product page.
pub async fn scrape_product(fetcher: &PageFetcher, url: &str) -> Result<ScrapedRecord, ApiError> {
    tracing::info!("scraping product page: {}", url);
    let html = fetcher.fetch(url).await?;
    parse_product(&html)
}

/// Write records as pretty-printed JSON to a file, or stdout for `-`.
pub fn write_records(records: &[ScrapedRecord], destination: &str) -> Result<(), ApiError> {
    let json = serde_json::to_string_pretty(records).map_err(ApiError::internal)?;

    if destination == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json).map_err(ApiError::internal)?;
    } else {
        std::fs::write(Path::new(destination), json).map_err(ApiError::internal)?;
        tracing::info!("wrote {} records to {}", records.len(), destination);
    }

    Ok(())
}
