use std::sync::Arc;
use uuid::Uuid;

use crate::application::services::DocumentIngestionService;
use crate::application::services::ingestion_service::IngestionError;
use crate::domain::value_objects::DocumentType;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug)]
pub enum UploadDocumentError {
    ValidationError(String),
    UnsupportedFileType(String),
    FileTooLarge { size: usize, limit: usize },
    ProcessingError(String),
    UpstreamError(String),
}

impl std::fmt::Display for UploadDocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadDocumentError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            UploadDocumentError::UnsupportedFileType(name) => {
                write!(f, "Unsupported file type: {}", name)
            }
            UploadDocumentError::FileTooLarge { size, limit } => {
                write!(f, "File size {} bytes exceeds the {} byte limit", size, limit)
            }
            UploadDocumentError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            UploadDocumentError::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
        }
    }
}

impl std::error::Error for UploadDocumentError {}

impl From<IngestionError> for UploadDocumentError {
    fn from(error: IngestionError) -> Self {
        match error {
            IngestionError::ExtractionError(_) | IngestionError::EmptyDocument(_) => {
                UploadDocumentError::ProcessingError(error.to_string())
            }
            IngestionError::EmbeddingError(_) | IngestionError::RepositoryError(_) => {
                UploadDocumentError::UpstreamError(error.to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadDocumentRequest {
    pub file_name: String,
    pub file_data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadDocumentResponse {
    pub file_name: String,
    pub document_id: Uuid,
    pub chunks_created: usize,
}

pub struct UploadDocumentUseCase {
    ingestion_service: Arc<DocumentIngestionService>,
    max_upload_bytes: usize,
}

impl UploadDocumentUseCase {
    pub fn new(ingestion_service: Arc<DocumentIngestionService>, max_upload_bytes: usize) -> Self {
        Self {
            ingestion_service,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Name checks that need no file content, so callers can reject a
    /// bad upload before reading its body.
    pub fn document_type_for(file_name: &str) -> Result<DocumentType, UploadDocumentError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(UploadDocumentError::ValidationError(
                "No file provided".to_string(),
            ));
        }

        DocumentType::from_file_name(file_name)
            .ok_or_else(|| UploadDocumentError::UnsupportedFileType(file_name.to_string()))
    }

    pub async fn execute(
        &self,
        request: UploadDocumentRequest,
    ) -> Result<UploadDocumentResponse, UploadDocumentError> {
        let file_name = request.file_name.trim();
        let document_type = Self::document_type_for(file_name)?;

        if request.file_data.len() > self.max_upload_bytes {
            return Err(UploadDocumentError::FileTooLarge {
                size: request.file_data.len(),
                limit: self.max_upload_bytes,
            });
        }

        if request.file_data.is_empty() {
            return Err(UploadDocumentError::ValidationError(
                "File data cannot be empty".to_string(),
            ));
        }

        let ingested = self
            .ingestion_service
            .ingest(file_name, &request.file_data, document_type)
            .await?;

        Ok(UploadDocumentResponse {
            file_name: file_name.to_string(),
            document_id: ingested.document_id,
            chunks_created: ingested.chunks_created,
        })
    }
}
