use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{documents, health, search};
use crate::state::AppState;

/// Application router: health probe plus the document/search API.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/documents", post(documents::upload_document))
        .route("/api/search", post(search::search_documents))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}
