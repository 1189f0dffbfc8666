//! Text chunking for the RAG pipeline.
//!
//! Splits a document into overlapping character windows, preferring to cut
//! at a sentence boundary near the end of each window.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks.
    pub chunk_overlap: usize,
    /// Hard cap on the number of chunks produced per source.
    pub max_chunks: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            max_chunks: 200,
        }
    }
}

/// A chunk of a source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    /// Source identifier (file path, URL, ...).
    pub source: String,
    /// Character offset of the chunk within the source.
    pub start_offset: usize,
    pub chunk_index: usize,
}

pub fn split_into_chunks(text: &str, source: &str, config: &ChunkConfig) -> Vec<TextChunk> {
    let chunk_size = config.chunk_size.max(1);
    let step = chunk_size.saturating_sub(config.chunk_overlap).max(1);

    let chars: Vec<char> = text.chars().collect();
    let total_chars = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_index = 0;

    while start < total_chars && chunks.len() < config.max_chunks {
        let end = (start + chunk_size).min(total_chars);
        let window: String = chars[start..end].iter().collect();

        let final_text = if end < total_chars {
            find_sentence_boundary(&window)
        } else {
            window
        };

        let trimmed = final_text.trim();
        if !trimmed.is_empty() {
            chunks.push(TextChunk {
                text: trimmed.to_string(),
                source: source.to_string(),
                start_offset: start,
                chunk_index,
            });
            chunk_index += 1;
        }

        start += step;
    }

    chunks
}

/// Cut the window at the last sentence ending in its final fifth, if any.
fn find_sentence_boundary(text: &str) -> String {
    let sentence_endings = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

    let search_start = text
        .char_indices()
        .nth(text.chars().count() * 80 / 100)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let search_text = &text[search_start..];

    for ending in sentence_endings.iter() {
        if let Some(pos) = search_text.rfind(ending) {
            let cut_pos = search_start + pos + ending.len();
            return text[..cut_pos].to_string();
        }
    }

    text.to_string()
}
