//! Retrieval-augmented question answering over a local corpus file.
//!
//! Reads a corpus, chunks it, indexes the chunks in an in-process vector
//! store, retrieves the top-k chunks for the configured question and asks
//! the chat model for a grounded answer. Configuration is entirely via
//! environment variables: RECALL_CORPUS, RECALL_QUESTION, RECALL_TOP_K.

use std::env;
use std::sync::Arc;

use recall::chunker::{split_into_chunks, ChunkConfig};
use recall::core::{logging, ApiError, AppConfig};
use recall::embedding::OpenAiEmbedder;
use recall::llm::{ChatProvider, OpenAiChat};
use recall::rag::{rag_request, Retriever};
use recall::store::{MemoryStore, StoredDocument};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {}", err);
            std::process::exit(1);
        }
    };
    logging::init(&config.log_dir);

    if let Err(err) = run(&config).await {
        tracing::error!("rag pipeline failed: {}", err);
        std::process::exit(1);
    }
}

async fn run(config: &AppConfig) -> Result<(), ApiError> {
    let corpus_path = env::var("RECALL_CORPUS").unwrap_or_else(|_| "corpus.txt".to_string());
    let question = env::var("RECALL_QUESTION")
        .map_err(|_| ApiError::BadRequest("RECALL_QUESTION is not set".to_string()))?;
    let top_k = env::var("RECALL_TOP_K")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(3);

    let corpus = std::fs::read_to_string(&corpus_path).map_err(|err| {
        ApiError::BadRequest(format!("cannot read corpus {}: {}", corpus_path, err))
    })?;

    let chunks = split_into_chunks(&corpus, &corpus_path, &ChunkConfig::default());
    if chunks.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "corpus {} produced no chunks",
            corpus_path
        )));
    }
    tracing::info!("split corpus into {} chunks", chunks.len());

    let embedder = Arc::new(OpenAiEmbedder::new(config)?);
    let retriever = Retriever::new(embedder, Arc::new(MemoryStore::new()));

    let documents = chunks
        .into_iter()
        .map(|chunk| StoredDocument {
            id: format!("{}#{}", chunk.source, chunk.chunk_index),
            content: chunk.text,
            title: None,
            metadata: Some(serde_json::json!({ "start_offset": chunk.start_offset })),
        })
        .collect();
    let indexed = retriever.index_documents(documents).await?;
    tracing::info!("indexed {} chunks", indexed);

    let hits = retriever.retrieve(&question, top_k).await?;
    println!("Retrieved context chunks:");
    for hit in &hits {
        println!("- [{:.3}] {}", hit.score, hit.document.content);
    }

    let contexts: Vec<String> = hits.iter().map(|hit| hit.document.content.clone()).collect();
    let chat = OpenAiChat::new(config)?;
    let answer = chat.chat(rag_request(&question, &contexts)).await?;

    println!("\nQuestion: {}", question);
    println!("\nAnswer:\n{}", answer);

    Ok(())
}
