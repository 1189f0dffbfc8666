//! Text generation against an external chat-completion service.

mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

pub use openai::OpenAiChat;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Non-streaming chat completion; returns the assistant message text.
    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError>;
}
