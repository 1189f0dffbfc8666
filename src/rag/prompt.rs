//! Prompt assembly for retrieval-augmented generation.
//!
//! The generated request contains all and only the retrieved texts, in
//! retrieval order, followed by the original query.

use crate::llm::{ChatMessage, ChatRequest};

pub const SYSTEM_PROMPT: &str = "You are a knowledgeable assistant. Ensure that your answers \
are directly supported by the context provided, and refrain from including information not \
present in the context.";

const RAG_TEMPERATURE: f64 = 0.2;
const RAG_MAX_TOKENS: u32 = 300;

/// Combine retrieved context texts and the user query into one prompt.
pub fn build_prompt(query: &str, contexts: &[String]) -> String {
    let context = contexts.join("\n\n");
    format!(
        "Based solely on the context provided below, answer the user's query succinctly and \
accurately. If the context does not contain enough information, indicate any gaps in the \
data.\n\nContext:\n{}\n\nUser Query: {}\n\nAnswer:",
        context, query
    )
}

/// Full chat request for a grounded answer.
pub fn rag_request(query: &str, contexts: &[String]) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(query, contexts)),
        ],
        temperature: Some(RAG_TEMPERATURE),
        max_tokens: Some(RAG_MAX_TOKENS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_all_and_only_retrieved_texts() {
        let contexts = vec![
            "First retrieved chunk.".to_string(),
            "Second retrieved chunk.".to_string(),
        ];
        let prompt = build_prompt("what happened?", &contexts);

        for ctx in &contexts {
            assert!(prompt.contains(ctx));
        }
        assert!(prompt.contains("what happened?"));
        assert!(!prompt.contains("Third"));
    }

    #[test]
    fn contexts_appear_in_retrieval_order() {
        let contexts = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        let prompt = build_prompt("q", &contexts);

        let a = prompt.find("alpha").unwrap();
        let b = prompt.find("beta").unwrap();
        let g = prompt.find("gamma").unwrap();
        assert!(a < b && b < g);
    }

    #[test]
    fn request_carries_system_and_user_messages() {
        let request = rag_request("q", &["ctx".to_string()]);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(300));
    }
}
