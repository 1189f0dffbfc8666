use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{ChatProvider, ChatRequest};
use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::embedding::openai::{build_bearer_client, error_for_status};

/// Chat client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct OpenAiChat {
    client: Client,
    endpoint: String,
    model: String,
}

impl OpenAiChat {
    /// Build a client from the process configuration.
    ///
    /// Like the embedder, a missing API key fails here rather than at the
    /// first request.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = build_bearer_client(config)?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base_url),
            model: config.chat_model.clone(),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError> {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

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
            return Err(error_for_status(status, "generation", &text));
        }

        let payload: Value = res.json().await.map_err(ApiError::network)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ApiError::Generation("response has no message content".to_string())
            })?
            .to_string();

        Ok(content)
    }
}
