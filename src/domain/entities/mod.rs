pub mod document_chunk;
pub mod retrieved_chunk;
pub mod tool_call;

pub use document_chunk::DocumentChunk;
pub use retrieved_chunk::{RetrievedChunk, sort_by_score_desc};
pub use tool_call::ToolCall;
