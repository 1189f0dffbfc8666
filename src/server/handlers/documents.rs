use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::state::AppState;
use crate::store::StoredDocument;

#[derive(Debug, Deserialize)]
pub struct DocumentUpload {
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Caller-supplied id; a UUID is generated when absent.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Upload a document: embed its content and upsert it into the store.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(upload): Json<DocumentUpload>,
) -> Result<Json<DocumentResponse>, ApiError> {
    if upload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be empty".to_string()));
    }

    let id = upload
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let document = StoredDocument {
        id: id.clone(),
        content: upload.content.clone(),
        title: upload.title.clone(),
        metadata: Some(json!({ "uploaded_at": chrono::Utc::now().to_rfc3339() })),
    };

    state.retriever.index_document(document).await?;
    tracing::info!("indexed document {}", id);

    Ok(Json(DocumentResponse {
        id,
        content: upload.content,
        title: upload.title,
    }))
}
