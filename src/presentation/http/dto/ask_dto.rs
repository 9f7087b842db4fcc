use serde::{Deserialize, Serialize};

use crate::application::services::rag_pipeline::GeneratedAnswer;
use crate::application::use_cases::ask_question::AskQuestionRequest;
use crate::domain::entities::{RetrievedChunk, ToolCall};

#[derive(Debug, Deserialize)]
pub struct AskRequestDto {
    pub question: String,
    #[serde(default)]
    pub max_results: Option<i32>,
    #[serde(default)]
    pub use_tool_calling: bool,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default = "default_use_latest_document")]
    pub use_latest_document: bool,
}

fn default_use_latest_document() -> bool {
    true
}

impl From<AskRequestDto> for AskQuestionRequest {
    fn from(dto: AskRequestDto) -> Self {
        Self {
            question: dto.question,
            max_results: dto.max_results,
            use_tool_calling: dto.use_tool_calling,
            document_id: dto.document_id,
            filename: dto.filename,
            use_latest_document: dto.use_latest_document,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimpleAskQuery {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct RetrievedChunkDto {
    pub content: String,
    pub metadata: serde_json::Value,
    pub similarity_score: f64,
}

impl From<RetrievedChunk> for RetrievedChunkDto {
    fn from(chunk: RetrievedChunk) -> Self {
        let (content, metadata, score) = chunk.into_parts();
        Self {
            content,
            metadata,
            similarity_score: (score * 10_000.0).round() / 10_000.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToolCallDto {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub result: Option<String>,
}

impl From<ToolCall> for ToolCallDto {
    fn from(call: ToolCall) -> Self {
        Self {
            tool_name: call.tool_name,
            arguments: call.arguments,
            result: call.result,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AskResponseDto {
    pub answer: String,
    pub retrieved_chunks: Vec<RetrievedChunkDto>,
    /// `null` when no tool ran.
    pub tool_calls: Option<Vec<ToolCallDto>>,
    pub tokens_used: Option<u32>,
}

impl From<GeneratedAnswer> for AskResponseDto {
    fn from(answer: GeneratedAnswer) -> Self {
        let tool_calls = (!answer.tool_calls.is_empty())
            .then(|| answer.tool_calls.into_iter().map(ToolCallDto::from).collect());

        Self {
            answer: answer.answer,
            retrieved_chunks: answer
                .retrieved_chunks
                .into_iter()
                .map(RetrievedChunkDto::from)
                .collect(),
            tool_calls,
            tokens_used: answer.tokens_used,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimpleAnswerDto {
    pub answer: String,
}
