use std::sync::Arc;

use crate::core::errors::ApiError;
use crate::embedding::EmbeddingProvider;
use crate::store::{SearchHit, StoredDocument, VectorStore};

/// Indexing and retrieval over one embedder/store pair.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Embed and upsert a single document.
    ///
    /// The document is stored all-or-nothing: an embedding or store
    /// failure leaves the store untouched for this id.
    pub async fn index_document(&self, document: StoredDocument) -> Result<(), ApiError> {
        let embedding = self.embedder.embed_one(&document.content).await?;
        self.store.upsert(document, embedding).await
    }

    /// Embed and upsert documents in order.
    ///
    /// Stops at the first failure; documents indexed before it remain in
    /// the store (per-document atomicity, not batch atomicity).
    pub async fn index_documents(&self, documents: Vec<StoredDocument>) -> Result<usize, ApiError> {
        let mut indexed = 0;
        for document in documents {
            self.index_document(document).await?;
            indexed += 1;
        }
        Ok(indexed)
    }

    /// Top-k documents most similar to the query text.
    ///
    /// Ordering is exactly the store's similarity ranking; no re-ranking.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, ApiError> {
        if query.trim().is_empty() {
            return Err(ApiError::BadRequest("query must not be empty".to_string()));
        }
        if k == 0 {
            return Err(ApiError::BadRequest("k must be positive".to_string()));
        }

        let query_embedding = self.embedder.embed_one(query).await?;
        self.store.search(&query_embedding, k).await
    }
}
