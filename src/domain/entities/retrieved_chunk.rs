use serde::{Deserialize, Serialize};

/// Source label given to context that came from a tool call rather than
/// from the vector store.
pub const TOOL_CALL_SOURCE: &str = "tool_call";

/// A chunk returned by similarity search, paired with its score
/// (`1 - cosine distance`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    content: String,
    metadata: serde_json::Value,
    similarity_score: f64,
}

impl RetrievedChunk {
    pub fn new(content: String, metadata: serde_json::Value, similarity_score: f64) -> Self {
        Self {
            content,
            metadata,
            similarity_score,
        }
    }

    /// Synthetic chunk carrying a tool result into the prompt context.
    pub fn from_tool_result(result: String) -> Self {
        Self {
            content: result,
            metadata: serde_json::json!({ "source": TOOL_CALL_SOURCE }),
            similarity_score: 1.0,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn similarity_score(&self) -> f64 {
        self.similarity_score
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|v| v.as_str())
    }

    pub fn page(&self) -> Option<i64> {
        self.metadata.get("page").and_then(|v| v.as_i64())
    }

    pub fn into_parts(self) -> (String, serde_json::Value, f64) {
        (self.content, self.metadata, self.similarity_score)
    }
}

/// Orders chunks by non-increasing score. Stable, so equal scores keep the
/// order the store returned them in.
pub fn sort_by_score_desc(chunks: &mut [RetrievedChunk]) {
    chunks.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
}
