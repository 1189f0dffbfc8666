//! Embedding-indexed retrieval toolkit.
//!
//! Three thin pipelines over external services: a semantic search HTTP
//! API, a retrieval-augmented QA flow, and a product listing scraper.

pub mod chunker;
pub mod core;
pub mod embedding;
pub mod llm;
pub mod rag;
pub mod scrape;
pub mod server;
pub mod state;
pub mod store;
