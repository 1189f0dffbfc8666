//! SQLite-backed vector store.
//!
//! Embeddings live in a BLOB column as little-endian f32s; search is
//! brute-force cosine over every row, which is plenty for prototype-scale
//! corpora. A meta table pins the embedding dimension and model so a
//! store can never mix vectors of different shapes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::{cosine_similarity, SearchHit, StoredDocument, VectorStore};
use crate::core::errors::ApiError;

pub struct SqliteVectorStore {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteVectorStore {
    pub async fn open(db_path: &Path, embedding_model: &str) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::store)?;

        let store = Self {
            pool,
            db_path: db_path.to_path_buf(),
        };
        store.init_schema(embedding_model).await?;
        Ok(store)
    }

    async fn init_schema(&self, embedding_model: &str) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                title TEXT,
                metadata TEXT DEFAULT '{}',
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::store)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS store_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::store)?;

        sqlx::query(
            "INSERT OR IGNORE INTO store_meta (key, value) VALUES ('embedding_model', ?1)",
        )
        .bind(embedding_model)
        .execute(&self.pool)
        .await
        .map_err(ApiError::store)?;

        Ok(())
    }

    /// Dimension pinned by the first insert, if any.
    async fn pinned_dimension(&self) -> Result<Option<usize>, ApiError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM store_meta WHERE key = 'embedding_dim'")
                .fetch_optional(&self.pool)
                .await
                .map_err(ApiError::store)?;

        Ok(value.and_then(|v| v.parse::<usize>().ok()))
    }

    async fn check_dimension(&self, embedding: &[f32]) -> Result<(), ApiError> {
        if embedding.is_empty() {
            return Err(ApiError::Store("refusing to store an empty vector".to_string()));
        }
        match self.pinned_dimension().await? {
            Some(dim) if dim != embedding.len() => Err(ApiError::Store(format!(
                "embedding dimension {} does not match store dimension {}",
                embedding.len(),
                dim
            ))),
            Some(_) => Ok(()),
            None => {
                sqlx::query(
                    "INSERT OR REPLACE INTO store_meta (key, value, updated_at)
                     VALUES ('embedding_dim', ?1, STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                )
                .bind(embedding.len().to_string())
                .execute(&self.pool)
                .await
                .map_err(ApiError::store)?;
                Ok(())
            }
        }
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> StoredDocument {
        let metadata_str: String = row.get("metadata");
        let metadata = serde_json::from_str::<Value>(&metadata_str).ok();

        StoredDocument {
            id: row.get("id"),
            content: row.get("content"),
            title: row.get("title"),
            metadata,
        }
    }

    async fn insert_row(&self, document: &StoredDocument, embedding: &[f32]) -> Result<(), ApiError> {
        let blob = Self::serialize_embedding(embedding);
        let metadata_str = document
            .metadata
            .as_ref()
            .map(|m| serde_json::to_string(m).unwrap_or_default())
            .unwrap_or_else(|| "{}".to_string());

        sqlx::query(
            "INSERT OR REPLACE INTO documents (id, content, title, metadata, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&document.id)
        .bind(&document.content)
        .bind(document.title.as_deref())
        .bind(&metadata_str)
        .bind(&blob)
        .execute(&self.pool)
        .await
        .map_err(ApiError::store)?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn upsert(&self, document: StoredDocument, embedding: Vec<f32>) -> Result<(), ApiError> {
        self.check_dimension(&embedding).await?;
        self.insert_row(&document, &embedding).await
    }

    async fn upsert_batch(
        &self,
        items: Vec<(StoredDocument, Vec<f32>)>,
    ) -> Result<(), ApiError> {
        for (document, embedding) in &items {
            self.check_dimension(embedding).await?;
            self.insert_row(document, embedding).await?;
        }
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchHit>, ApiError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT id, content, title, metadata, embedding FROM documents")
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::store)?;

        let mut scored: Vec<SearchHit> = rows
            .iter()
            .map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&embedding_bytes);
                SearchHit {
                    document: Self::row_to_document(row),
                    score: cosine_similarity(query_embedding, &stored),
                }
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
        let row = sqlx::query("SELECT id, content, title, metadata FROM documents WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::store)?;

        Ok(row.as_ref().map(Self::row_to_document))
    }

    async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::store)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::store)?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (tempfile::TempDir, SqliteVectorStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::open(&dir.path().join("test.db"), "test-model")
            .await
            .unwrap();
        (dir, store)
    }

    fn doc(id: &str, content: &str) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            content: content.to_string(),
            title: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn upsert_and_search() {
        let (_dir, store) = test_store().await;

        store.upsert(doc("d1", "hello world"), vec![1.0, 0.0, 0.0]).await.unwrap();
        store.upsert(doc("d2", "other text"), vec![0.0, 1.0, 0.0]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        let hits = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.id, "d1");
        assert!(hits[0].score > 0.99);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn search_never_exceeds_k() {
        let (_dir, store) = test_store().await;

        for i in 0..5 {
            store
                .upsert(doc(&format!("d{}", i), "text"), vec![i as f32 + 1.0, 1.0])
                .await
                .unwrap();
        }

        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(store.search(&[1.0, 0.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dimension_is_pinned_by_first_insert() {
        let (_dir, store) = test_store().await;

        store.upsert(doc("d1", "a"), vec![1.0, 2.0, 3.0]).await.unwrap();

        let err = store.upsert(doc("d2", "b"), vec![1.0, 2.0]).await.unwrap_err();
        assert!(matches!(err, ApiError::Store(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_id() {
        let (_dir, store) = test_store().await;

        store.upsert(doc("d1", "old"), vec![1.0]).await.unwrap();
        store.upsert(doc("d1", "new"), vec![0.5]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let fetched = store.get("d1").await.unwrap().unwrap();
        assert_eq!(fetched.content, "new");
    }

    #[tokio::test]
    async fn delete_and_get() {
        let (_dir, store) = test_store().await;

        store.upsert(doc("d1", "text"), vec![1.0]).await.unwrap();
        assert!(store.get("d1").await.unwrap().is_some());
        assert!(store.delete("d1").await.unwrap());
        assert!(!store.delete("d1").await.unwrap());
        assert!(store.get("d1").await.unwrap().is_none());
    }
}
