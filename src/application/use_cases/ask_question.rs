use std::sync::Arc;

use crate::application::services::RagPipeline;
use crate::application::services::rag_pipeline::{AnswerRequest, GeneratedAnswer};
use crate::domain::repositories::DocumentRepository;
use crate::domain::value_objects::MetadataFilter;

pub const DEFAULT_MAX_RESULTS: i32 = 4;
pub const MAX_RESULTS_LIMIT: i32 = 10;

#[derive(Debug)]
pub enum AskQuestionError {
    ValidationError(String),
    UpstreamError(String),
}

impl std::fmt::Display for AskQuestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AskQuestionError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AskQuestionError::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
        }
    }
}

impl std::error::Error for AskQuestionError {}

#[derive(Debug, Clone)]
pub struct AskQuestionRequest {
    pub question: String,
    pub max_results: Option<i32>,
    pub use_tool_calling: bool,
    pub document_id: Option<String>,
    pub filename: Option<String>,
    pub use_latest_document: bool,
}

impl AskQuestionRequest {
    /// Plain question over the whole collection, no tools.
    pub fn simple(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            max_results: None,
            use_tool_calling: false,
            document_id: None,
            filename: None,
            use_latest_document: false,
        }
    }
}

pub struct AskQuestionUseCase {
    rag_pipeline: Arc<RagPipeline>,
    document_repository: Arc<dyn DocumentRepository>,
}

impl AskQuestionUseCase {
    pub fn new(
        rag_pipeline: Arc<RagPipeline>,
        document_repository: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            rag_pipeline,
            document_repository,
        }
    }

    pub async fn execute(
        &self,
        request: AskQuestionRequest,
    ) -> Result<GeneratedAnswer, AskQuestionError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(AskQuestionError::ValidationError(
                "Question cannot be empty".to_string(),
            ));
        }

        let max_results = request.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(AskQuestionError::ValidationError(format!(
                "max_results must be between 1 and {}",
                MAX_RESULTS_LIMIT
            )));
        }

        let filter = self.resolve_filter(&request).await;

        self.rag_pipeline
            .generate_answer(AnswerRequest {
                question: question.to_string(),
                max_results,
                use_tool_calling: request.use_tool_calling,
                filter,
            })
            .await
            .map_err(|e| AskQuestionError::UpstreamError(e.to_string()))
    }

    /// Explicit document id, then file name, then the most recent upload.
    async fn resolve_filter(&self, request: &AskQuestionRequest) -> Option<MetadataFilter> {
        if let Some(document_id) = non_blank(&request.document_id) {
            return Some(MetadataFilter::by_document_id(document_id));
        }

        if let Some(filename) = non_blank(&request.filename) {
            return Some(MetadataFilter::by_source(filename));
        }

        if !request.use_latest_document {
            return None;
        }

        match self.document_repository.latest_source().await {
            Ok(Some(source)) => Some(MetadataFilter::by_source(source)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not look up latest document, searching all: {}", e);
                None
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
