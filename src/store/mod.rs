//! Vector store abstraction over `(id, vector, metadata)` triples.
//!
//! The store is the sole owner of stored entries. The trait mirrors what
//! the pipelines need: upsert and top-k similarity search, nothing more.

mod memory;
mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

pub use memory::MemoryStore;
pub use sqlite::SqliteVectorStore;

/// A document as stored alongside its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// One search match: the document plus its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: StoredDocument,
    /// Cosine similarity; higher is better.
    pub score: f32,
}

/// Storage backend for embedded documents.
///
/// Implementations enforce a single embedding dimensionality per store:
/// the first inserted vector pins the dimension and later inserts with a
/// different length are rejected.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a document with its embedding, replacing any existing id.
    async fn upsert(&self, document: StoredDocument, embedding: Vec<f32>) -> Result<(), ApiError>;

    /// Insert multiple documents in one operation.
    async fn upsert_batch(
        &self,
        items: Vec<(StoredDocument, Vec<f32>)>,
    ) -> Result<(), ApiError>;

    /// Top-k documents by descending cosine similarity to the query.
    ///
    /// Returns at most `k` hits, never more.
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchHit>, ApiError>;

    /// Fetch a document by id.
    async fn get(&self, id: &str) -> Result<Option<StoredDocument>, ApiError>;

    /// Delete a document by id; returns whether anything was removed.
    async fn delete(&self, id: &str) -> Result<bool, ApiError>;

    /// Total number of stored documents.
    async fn count(&self) -> Result<usize, ApiError>;
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = vec![1.0, 2.0, 3.0, 4.0];
        assert!(approx_eq(cosine_similarity(&vec, &vec), 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_vectors() {
        assert!(approx_eq(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0));
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        assert!(approx_eq(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0));
    }
}
