//! End-to-end retrieval properties over the SQLite store with a
//! deterministic embedder.

use std::sync::Arc;

use async_trait::async_trait;

use recall::core::ApiError;
use recall::embedding::EmbeddingProvider;
use recall::rag::{build_prompt, Retriever};
use recall::store::{SqliteVectorStore, StoredDocument};

/// Embeds text as normalized letter-frequency vectors; identical text
/// always embeds identically, similar text scores high.
struct LetterFrequencyEmbedder;

#[async_trait]
impl EmbeddingProvider for LetterFrequencyEmbedder {
    fn model(&self) -> &str {
        "letter-frequency-test"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs
            .iter()
            .map(|text| {
                let mut counts = [0.0f32; 26];
                for c in text.to_lowercase().chars() {
                    if c.is_ascii_lowercase() {
                        counts[(c as u8 - b'a') as usize] += 1.0;
                    }
                }
                counts.to_vec()
            })
            .collect())
    }
}

fn doc(id: &str, content: &str) -> StoredDocument {
    StoredDocument {
        id: id.to_string(),
        content: content.to_string(),
        title: None,
        metadata: None,
    }
}

async fn sqlite_retriever(dir: &tempfile::TempDir) -> Retriever {
    let store = SqliteVectorStore::open(&dir.path().join("retrieval.db"), "letter-frequency-test")
        .await
        .unwrap();
    Retriever::new(Arc::new(LetterFrequencyEmbedder), Arc::new(store))
}

#[tokio::test]
async fn querying_with_a_documents_own_text_returns_it() {
    let dir = tempfile::tempdir().unwrap();
    let retriever = sqlite_retriever(&dir).await;

    let corpus = [
        ("d1", "The tango originated in Buenos Aires in the late nineteenth century."),
        ("d2", "The Perito Moreno glacier is one of the few still advancing."),
        ("d3", "Asado is a traditional barbecue central to the culinary culture."),
        ("d4", "The peso has faced recurring inflation over recent decades."),
    ];
    retriever
        .index_documents(corpus.iter().map(|(id, text)| doc(id, text)).collect())
        .await
        .unwrap();

    for (id, text) in corpus {
        let hits = retriever.retrieve(text, 2).await.unwrap();
        assert_eq!(hits[0].document.id, id, "own text should rank first for {}", id);
    }
}

#[tokio::test]
async fn results_are_bounded_by_k_with_non_increasing_scores() {
    let dir = tempfile::tempdir().unwrap();
    let retriever = sqlite_retriever(&dir).await;

    let documents = (0..8)
        .map(|i| doc(&format!("d{}", i), &format!("document number {} about things", i)))
        .collect();
    retriever.index_documents(documents).await.unwrap();

    let hits = retriever.retrieve("document number three", 4).await.unwrap();
    assert!(hits.len() <= 4);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn identical_text_embeds_to_identical_fixed_dimension() {
    let embedder = LetterFrequencyEmbedder;
    let first = embedder.embed_one("repeatable input").await.unwrap();
    let second = embedder.embed_one("repeatable input").await.unwrap();

    assert_eq!(first.len(), 26);
    assert_eq!(first, second);
}

#[tokio::test]
async fn rag_prompt_carries_exactly_the_retrieved_texts() {
    let dir = tempfile::tempdir().unwrap();
    let retriever = sqlite_retriever(&dir).await;

    retriever
        .index_documents(vec![
            doc("d1", "zebras graze at dawn"),
            doc("d2", "zebra stripes are unique"),
            doc("d3", "quartz forms hexagonal crystals"),
        ])
        .await
        .unwrap();

    let k = 2;
    let hits = retriever.retrieve("zebra", k).await.unwrap();
    assert_eq!(hits.len(), k);

    let contexts: Vec<String> = hits.iter().map(|h| h.document.content.clone()).collect();
    let prompt = build_prompt("zebra", &contexts);

    for ctx in &contexts {
        assert!(prompt.contains(ctx));
    }
    assert!(!prompt.contains("quartz forms hexagonal crystals"));
}
