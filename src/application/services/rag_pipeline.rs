use std::sync::Arc;

use crate::application::ports::chat_provider::{ChatMessage, ChatRequest, ChatResponse, ToolChoice};
use crate::application::ports::{ChatProvider, EmbeddingProvider};
use crate::application::services::tool_registry::ToolRegistry;
use crate::domain::entities::{RetrievedChunk, ToolCall, sort_by_score_desc};
use crate::domain::repositories::DocumentRepository;
use crate::domain::value_objects::MetadataFilter;

pub const NO_DOCUMENTS_ANSWER: &str = "I couldn't find any relevant documents to answer your question. \
Please upload a document first or try rephrasing the question.";

#[derive(Debug)]
pub enum RagPipelineError {
    EmbeddingError(String),
    RetrievalError(String),
    GenerationError(String),
}

impl std::fmt::Display for RagPipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RagPipelineError::EmbeddingError(msg) => write!(f, "Embedding error: {}", msg),
            RagPipelineError::RetrievalError(msg) => write!(f, "Retrieval error: {}", msg),
            RagPipelineError::GenerationError(msg) => write!(f, "Generation error: {}", msg),
        }
    }
}

impl std::error::Error for RagPipelineError {}

#[derive(Debug, Clone)]
pub struct AnswerRequest {
    pub question: String,
    pub max_results: i32,
    pub use_tool_calling: bool,
    pub filter: Option<MetadataFilter>,
}

#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    pub answer: String,
    /// Ordered by non-increasing similarity score.
    pub retrieved_chunks: Vec<RetrievedChunk>,
    pub tool_calls: Vec<ToolCall>,
    pub tokens_used: Option<u32>,
}

/// Retrieval-augmented generation: embed the question, pull the closest
/// chunks from the store, and ask the chat model to answer from them.
pub struct RagPipeline {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    document_repository: Arc<dyn DocumentRepository>,
    chat_provider: Arc<dyn ChatProvider>,
    tool_registry: ToolRegistry,
}

impl RagPipeline {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        document_repository: Arc<dyn DocumentRepository>,
        chat_provider: Arc<dyn ChatProvider>,
        tool_registry: ToolRegistry,
    ) -> Self {
        Self {
            embedding_provider,
            document_repository,
            chat_provider,
            tool_registry,
        }
    }

    pub async fn retrieve(
        &self,
        question: &str,
        max_results: i32,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievedChunk>, RagPipelineError> {
        let query = self
            .embedding_provider
            .generate_embedding(question)
            .await
            .map_err(|e| RagPipelineError::EmbeddingError(e.to_string()))?;
        tracing::debug!(
            "Embedded question with {} ({:?} tokens)",
            query.model_name,
            query.token_count
        );

        let mut chunks = self
            .document_repository
            .match_documents(&query.embedding, max_results, filter)
            .await
            .map_err(|e| RagPipelineError::RetrievalError(e.to_string()))?;

        sort_by_score_desc(&mut chunks);
        chunks.truncate(max_results.max(0) as usize);
        Ok(chunks)
    }

    pub async fn generate_answer(
        &self,
        request: AnswerRequest,
    ) -> Result<GeneratedAnswer, RagPipelineError> {
        let mut retrieved = self
            .retrieve(&request.question, request.max_results, request.filter.as_ref())
            .await?;

        tracing::info!(
            "Retrieved {} chunks for question (filter: {})",
            retrieved.len(),
            request
                .filter
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_string())
        );

        if retrieved.is_empty() && !request.use_tool_calling {
            return Ok(no_documents_answer());
        }

        let prompt = build_prompt(&format_context(&retrieved), &request.question);
        let mut messages = vec![ChatMessage::user(prompt.clone())];
        let tools = if request.use_tool_calling {
            self.tool_registry.definitions()
        } else {
            Vec::new()
        };

        let mut response = self
            .complete(ChatRequest {
                messages: messages.clone(),
                tools: tools.clone(),
                tool_choice: ToolChoice::Auto,
            })
            .await?;
        let mut reported_tokens = response.total_tokens;
        let mut tool_calls = Vec::new();

        if response.wants_tools() {
            messages.push(ChatMessage::assistant_tool_calls(response.tool_calls.clone()));

            let mut tool_chunks = Vec::new();
            for invocation in &response.tool_calls {
                let result = self.tool_registry.call(&invocation.name, &invocation.arguments);
                tracing::info!("Tool {} called with {}", invocation.name, invocation.arguments);

                messages.push(ChatMessage::tool_result(invocation.id.clone(), result.clone()));
                tool_chunks.push(RetrievedChunk::from_tool_result(result.clone()));
                tool_calls.push(ToolCall::new(
                    invocation.name.clone(),
                    invocation.arguments.clone(),
                    result,
                ));
            }

            response = self
                .complete(ChatRequest {
                    messages,
                    tools,
                    tool_choice: ToolChoice::None,
                })
                .await?;
            reported_tokens = reported_tokens.zip(response.total_tokens).map(|(a, b)| a + b);

            tool_chunks.append(&mut retrieved);
            retrieved = tool_chunks;
        }

        let answer = response.content.unwrap_or_default().trim().to_string();
        let tokens_used = reported_tokens.unwrap_or_else(|| estimate_tokens(&prompt, &answer));

        Ok(GeneratedAnswer {
            answer,
            retrieved_chunks: retrieved,
            tool_calls,
            tokens_used: Some(tokens_used),
        })
    }

    async fn complete(
        &self,
        request: ChatRequest,
    ) -> Result<ChatResponse, RagPipelineError> {
        self.chat_provider
            .complete(request)
            .await
            .map_err(|e| RagPipelineError::GenerationError(e.to_string()))
    }
}

fn no_documents_answer() -> GeneratedAnswer {
    GeneratedAnswer {
        answer: NO_DOCUMENTS_ANSWER.to_string(),
        retrieved_chunks: Vec::new(),
        tool_calls: Vec::new(),
        tokens_used: None,
    }
}

/// One block per chunk, numbered from 1.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            format!(
                "--- Document {} (Source: {}, Page: {}, Score: {:.2}) ---\n{}\n",
                i + 1,
                chunk.source().unwrap_or("Unknown"),
                chunk
                    .page()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                chunk.similarity_score(),
                chunk.content()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful AI assistant that answers questions based on the provided context.

Your task:
1. Use ONLY the context to answer.
2. If the answer isn't in the context, say you don't have the information.
3. Be concise and direct.

Context:
{context}

Question:
{question}

Answer:
"
    )
}

/// Rough count used when the API does not report usage: four characters per token.
fn estimate_tokens(prompt: &str, answer: &str) -> u32 {
    ((prompt.chars().count() + answer.chars().count()) / 4) as u32
}
