//! Embedding generation against an external embedding service.
//!
//! The service is treated as an opaque capability: text in, fixed-length
//! vector out. No retry or backoff is layered on top.

pub(crate) mod openai;

use async_trait::async_trait;

use crate::core::errors::ApiError;

pub use openai::OpenAiEmbedder;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// The model identifier this provider embeds with.
    fn model(&self) -> &str;

    /// Generate one embedding per input, in input order.
    ///
    /// Every returned vector has the same dimensionality.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    /// Convenience wrapper for embedding a single text.
    async fn embed_one(&self, input: &str) -> Result<Vec<f32>, ApiError> {
        let mut vectors = self.embed(&[input.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(ApiError::Embedding(format!(
                "expected 1 embedding, got {}",
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }
}
