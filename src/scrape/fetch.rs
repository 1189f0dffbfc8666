use std::time::Duration;

use reqwest::Client;

use crate::core::errors::ApiError;

/// Thin HTTP fetcher for scrape targets.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;
        Ok(Self { client })
    }

    /// GET a page and return its body.
    ///
    /// Any non-success status is a `Fetch` error; transport failures are
    /// `Network`. No retries.
    pub async fn fetch(&self, url: &str) -> Result<String, ApiError> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        res.text().await.map_err(ApiError::network)
    }
}
