//! In-process vector store.
//!
//! Backs the run-to-completion RAG pipeline, where the index lives and
//! dies with the process. Same contract as the SQLite store, including
//! the pinned-dimension invariant.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{cosine_similarity, SearchHit, StoredDocument, VectorStore};
use crate::core::errors::ApiError;

#[derive(Default)]
struct Inner {
    dimension: Option<usize>,
    entries: Vec<(StoredDocument, Vec<f32>)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_locked(inner: &mut Inner, document: StoredDocument, embedding: Vec<f32>) -> Result<(), ApiError> {
        if embedding.is_empty() {
            return Err(ApiError::Store("refusing to store an empty vector".to_string()));
        }
        match inner.dimension {
            Some(dim) if dim != embedding.len() => {
                return Err(ApiError::Store(format!(
                    "embedding dimension {} does not match store dimension {}",
                    embedding.len(),
                    dim
                )));
            }
            Some(_) => {}
            None => inner.dimension = Some(embedding.len()),
        }

        if let Some(existing) = inner.entries.iter_mut().find(|(d, _)| d.id == document.id) {
            *existing = (document, embedding);
        } else {
            inner.entries.push((document, embedding));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, ApiError> {
        self.inner
            .lock()
            .map_err(|_| ApiError::Store("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn upsert(&self, document: StoredDocument, embedding: Vec<f32>) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        Self::insert_locked(&mut inner, document, embedding)
    }

    async fn upsert_batch(
        &self,
        items: Vec<(StoredDocument, Vec<f32>)>,
    ) -> Result<(), ApiError> {
        let mut inner = self.lock()?;
        for (document, embedding) in items {
            Self::insert_locked(&mut inner, document, embedding)?;
        }
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchHit>, ApiError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let inner = self.lock()?;
        let mut scored: Vec<SearchHit> = inner
            .entries
            .iter()
            .map(|(document, embedding)| SearchHit {
                document: document.clone(),
                score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredDocument>, ApiError> {
        let inner = self.lock()?;
        Ok(inner
            .entries
            .iter()
            .find(|(d, _)| d.id == id)
            .map(|(d, _)| d.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let mut inner = self.lock()?;
        let before = inner.entries.len();
        inner.entries.retain(|(d, _)| d.id != id);
        Ok(inner.entries.len() < before)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        Ok(self.lock()?.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, content: &str) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            content: content.to_string(),
            title: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn ranks_by_descending_similarity() {
        let store = MemoryStore::new();
        store.upsert(doc("a", "a"), vec![0.8, 0.2]).await.unwrap();
        store.upsert(doc("b", "b"), vec![0.1, 0.9]).await.unwrap();
        store.upsert(doc("c", "c"), vec![0.9, 0.0]).await.unwrap();

        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.id, "c");
        assert_eq!(hits[1].document.id, "a");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn rejects_mismatched_dimension() {
        let store = MemoryStore::new();
        store.upsert(doc("a", "a"), vec![1.0, 0.0]).await.unwrap();

        let err = store.upsert(doc("b", "b"), vec![1.0]).await.unwrap_err();
        assert!(matches!(err, ApiError::Store(_)));
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_id() {
        let store = MemoryStore::new();
        store.upsert(doc("a", "old"), vec![1.0]).await.unwrap();
        store.upsert(doc("a", "new"), vec![0.2]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get("a").await.unwrap().unwrap().content, "new");
    }
}
