use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::state::AppState;

const DEFAULT_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Number of results to return; defaults to 5.
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchedDocument {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub results: Vec<MatchedDocument>,
}

/// Semantic search: embed the query and return the top-k stored documents.
pub async fn search_documents(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let k = request.k.unwrap_or(DEFAULT_RESULTS);
    let hits = state.retriever.retrieve(&request.query, k).await?;

    let results = hits
        .into_iter()
        .map(|hit| MatchedDocument {
            id: hit.document.id,
            content: hit.document.content,
            title: hit.document.title,
            score: hit.score,
        })
        .collect();

    Ok(Json(QueryResponse { results }))
}
