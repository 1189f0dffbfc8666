use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use super::EmbeddingProvider;
use crate::core::config::AppConfig;
use crate::core::errors::ApiError;

/// Embeddings client for OpenAI-compatible `/embeddings` endpoints.
#[derive(Clone, Debug)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl OpenAiEmbedder {
    /// Build a client from the process configuration.
    ///
    /// A missing or blank API key fails here, before any request is made.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = build_bearer_client(config)?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.api_base_url),
            model: config.embedding_model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        // The embedding API treats newlines as significant; flatten them.
        let cleaned: Vec<String> = inputs
            .iter()
            .map(|text| text.replace('\n', " "))
            .collect();

        let body = json!({
            "model": self.model,
            "input": cleaned,
        });

        let res = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(error_for_status(status, "embedding", &text));
        }

        let payload: Value = res.json().await.map_err(ApiError::network)?;
        let data = payload["data"]
            .as_array()
            .ok_or_else(|| ApiError::Embedding("response has no data array".to_string()))?;

        let mut embeddings = Vec::with_capacity(data.len());
        for item in data {
            let vals = item["embedding"].as_array().ok_or_else(|| {
                ApiError::Embedding("response item has no embedding array".to_string())
            })?;
            let vec: Vec<f32> = vals
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
            embeddings.push(vec);
        }

        if embeddings.len() != inputs.len() {
            return Err(ApiError::Embedding(format!(
                "requested {} embeddings, got {}",
                inputs.len(),
                embeddings.len()
            )));
        }
        if let Some(first) = embeddings.first() {
            let dim = first.len();
            if dim == 0 || embeddings.iter().any(|e| e.len() != dim) {
                return Err(ApiError::Embedding(
                    "embedding dimensionality inconsistent within response".to_string(),
                ));
            }
        }

        Ok(embeddings)
    }
}

/// Shared constructor for clients authenticating with a bearer key.
pub(crate) fn build_bearer_client(config: &AppConfig) -> Result<Client, ApiError> {
    let key = config.api_key.trim();
    if key.is_empty() {
        return Err(ApiError::Auth("API key is empty".to_string()));
    }

    let mut headers = HeaderMap::new();
    let auth = format!("Bearer {}", key);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth).map_err(|_| ApiError::Auth("invalid API key".to_string()))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(config.http_timeout)
        .default_headers(headers)
        .build()
        .map_err(ApiError::internal)
}

/// Map an upstream HTTP status to the matching error kind.
pub(crate) fn error_for_status(status: StatusCode, stage: &str, body: &str) -> ApiError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiError::Auth(format!("{} service rejected the API key", stage))
        }
        _ => match stage {
            "generation" => ApiError::Generation(format!("upstream {}: {}", status, body)),
            _ => ApiError::Embedding(format!("upstream {}: {}", status, body)),
        },
    }
}
