use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::embedding::OpenAiEmbedder;
use crate::rag::Retriever;
use crate::store::SqliteVectorStore;

/// Shared state for the search server, built once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub retriever: Retriever,
    #[allow(dead_code)]
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub async fn initialize(config: AppConfig) -> Result<Arc<Self>, ApiError> {
        let embedder = Arc::new(OpenAiEmbedder::new(&config)?);
        let store = Arc::new(
            SqliteVectorStore::open(&config.db_path, &config.embedding_model).await?,
        );
        let retriever = Retriever::new(embedder, store);
        let started_at = Utc::now();

        Ok(Arc::new(AppState {
            config,
            retriever,
            started_at,
        }))
    }
}
