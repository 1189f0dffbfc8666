//! Retrieval pipelines.
//!
//! `Retriever` wires an embedding provider to a vector store for indexing
//! and top-k lookup; `prompt` turns retrieved texts into a grounded
//! generation request.

mod prompt;
mod retriever;

pub use prompt::{build_prompt, rag_request, SYSTEM_PROMPT};
pub use retriever::Retriever;
