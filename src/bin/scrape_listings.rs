//! Product listing scraper.
//!
//! Scrapes the listing page named by RECALL_SCRAPE_URL and writes the
//! extracted records as JSON to RECALL_SCRAPE_OUT (default
//! `scraped_products.json`, `-` for stdout). Intended to be run to
//! completion by an external scheduler such as cron.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use recall::core::config::load_env;
use recall::core::{logging, ApiError};
use recall::scrape::{scrape_listing, write_records, PageFetcher};

#[tokio::main]
async fn main() {
    load_env();
    let log_dir = PathBuf::from(env::var("RECALL_LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
    logging::init(&log_dir);

    if let Err(err) = run().await {
        tracing::error!("scrape failed: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ApiError> {
    let url = env::var("RECALL_SCRAPE_URL")
        .map_err(|_| ApiError::BadRequest("RECALL_SCRAPE_URL is not set".to_string()))?;
    let destination =
        env::var("RECALL_SCRAPE_OUT").unwrap_or_else(|_| "scraped_products.json".to_string());
    let timeout_secs = env::var("RECALL_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(30);

    let fetcher = PageFetcher::new(Duration::from_secs(timeout_secs))?;
    let records = scrape_listing(&fetcher, &url).await?;

    write_records(&records, &destination)?;
    tracing::info!("scraping completed: {} records", records.len());

    Ok(())
}
