//! In-memory stand-ins for the ports, used by unit tests across layers.

use async_trait::async_trait;
use pgvector::Vector;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::ports::chat_provider::{
    ChatProvider, ChatProviderError, ChatRequest, ChatResponse, ToolInvocation,
};
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedDocument, ExtractedPage,
};
use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
    EmbeddingResponse,
};
use crate::domain::entities::{DocumentChunk, RetrievedChunk};
use crate::domain::repositories::document_repository::{
    DocumentRepository, DocumentRepositoryError, DocumentSummary,
};
use crate::domain::value_objects::{DocumentType, MetadataFilter};

const DIMENSION: usize = 16;

/// Bag-of-words hashing embedder: texts sharing words get close vectors.
pub struct FakeEmbeddingProvider {
    pub calls: Mutex<usize>,
    pub fail: bool,
}

impl FakeEmbeddingProvider {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(0),
            fail: true,
        }
    }

    pub fn embed(text: &str) -> Vector {
        let mut values = vec![0.0f32; DIMENSION];
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            let bucket = word.bytes().map(|b| b as usize).sum::<usize>() % DIMENSION;
            values[bucket] += 1.0;
        }
        values[DIMENSION - 1] += 0.01;
        Vector::from(values)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddingProvider {
    async fn generate_embedding(
        &self,
        text: &str,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(EmbeddingProviderError::ServiceUnavailable);
        }
        Ok(EmbeddingResponse {
            embedding: Self::embed(text),
            model_name: "fake".to_string(),
            token_count: None,
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(EmbeddingProviderError::ServiceUnavailable);
        }
        Ok(BatchEmbeddingResponse {
            embeddings: request.texts.iter().map(|t| Self::embed(t)).collect(),
            model_name: "fake".to_string(),
            total_tokens: None,
        })
    }

    fn model_name(&self) -> &str {
        "fake"
    }

    fn embedding_dimension(&self) -> usize {
        DIMENSION
    }
}

/// Vector store kept in a `Vec`, scored with cosine similarity.
pub struct InMemoryDocumentRepository {
    pub rows: Mutex<Vec<DocumentChunk>>,
    /// Number of successful `save_batch` calls before every further one fails.
    pub fail_after_batches: Option<usize>,
    pub fail_latest_source: bool,
    batches: Mutex<usize>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_after_batches: None,
            fail_latest_source: false,
            batches: Mutex::new(0),
        }
    }

    pub fn failing_after(batches: usize) -> Self {
        Self {
            fail_after_batches: Some(batches),
            ..Self::new()
        }
    }

    pub fn failing_latest_source() -> Self {
        Self {
            fail_latest_source: true,
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn save_batch(&self, chunks: &[DocumentChunk]) -> Result<usize, DocumentRepositoryError> {
        let mut batches = self.batches.lock().unwrap();
        if self.fail_after_batches.is_some_and(|limit| *batches >= limit) {
            return Err(DocumentRepositoryError::DatabaseError(
                "connection reset".to_string(),
            ));
        }
        *batches += 1;

        self.rows.lock().unwrap().extend_from_slice(chunks);
        Ok(chunks.len())
    }

    async fn match_documents(
        &self,
        query_vector: &Vector,
        match_count: i32,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievedChunk>, DocumentRepositoryError> {
        let rows = self.rows.lock().unwrap();
        let mut results: Vec<RetrievedChunk> = rows
            .iter()
            .filter(|row| filter.is_none_or(|f| f.matches(&row.metadata().to_json())))
            .filter_map(|row| {
                let embedding = row.embedding()?;
                Some(RetrievedChunk::new(
                    row.content().to_string(),
                    row.metadata().to_json(),
                    cosine_similarity(query_vector, embedding),
                ))
            })
            .collect();

        results.sort_by(|a, b| b.similarity_score().total_cmp(&a.similarity_score()));
        results.truncate(match_count.max(0) as usize);
        Ok(results)
    }

    async fn count(&self) -> Result<i64, DocumentRepositoryError> {
        Ok(self.len() as i64)
    }

    fn table_name(&self) -> &str {
        "documents"
    }

    async fn latest_source(&self) -> Result<Option<String>, DocumentRepositoryError> {
        if self.fail_latest_source {
            return Err(DocumentRepositoryError::DatabaseError(
                "statement timeout".to_string(),
            ));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .last()
            .map(|row| row.metadata().source.clone()))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, DocumentRepositoryError> {
        let rows = self.rows.lock().unwrap();
        let mut summaries: Vec<DocumentSummary> = Vec::new();

        for row in rows.iter().rev() {
            let metadata = row.metadata();
            match summaries.iter_mut().find(|s| s.filename == metadata.source) {
                Some(summary) => summary.chunk_count += 1,
                None => summaries.push(DocumentSummary {
                    filename: metadata.source.clone(),
                    document_id: Some(metadata.document_id.to_string()),
                    file_type: Some(metadata.file_type.clone()),
                    chunk_count: 1,
                }),
            }
        }

        Ok(summaries)
    }
}

fn cosine_similarity(a: &Vector, b: &Vector) -> f64 {
    let a = a.as_slice();
    let b = b.as_slice();
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)) as f64
}

/// Replays canned responses in order and records every request.
pub struct ScriptedChatProvider {
    responses: Mutex<VecDeque<Result<ChatResponse, ChatProviderError>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatProvider {
    pub fn new(responses: Vec<Result<ChatResponse, ChatProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::new(vec![Ok(text_response(text, Some(42)))])
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

pub fn text_response(text: &str, total_tokens: Option<u32>) -> ChatResponse {
    ChatResponse {
        content: Some(text.to_string()),
        tool_calls: Vec::new(),
        total_tokens,
    }
}

pub fn tool_call_response(name: &str, arguments: serde_json::Value) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: vec![ToolInvocation {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }],
        total_tokens: Some(30),
    }
}

#[async_trait]
impl ChatProvider for ScriptedChatProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ChatProviderError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ChatProviderError::EmptyResponse))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Treats every input as UTF-8 text, one page per form feed.
pub struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(
        &self,
        data: &[u8],
        _document_type: DocumentType,
    ) -> Result<ExtractedDocument, DocumentExtractionError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;

        let pages: Vec<&str> = text.split('\u{c}').collect();
        if pages.len() == 1 {
            return Ok(ExtractedDocument::single(text.to_string()));
        }

        Ok(ExtractedDocument {
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(i, page)| ExtractedPage {
                    page_number: Some(i as u32 + 1),
                    text: page.to_string(),
                })
                .collect(),
            title: None,
        })
    }

    fn can_extract(&self, _document_type: DocumentType) -> bool {
        true
    }
}
