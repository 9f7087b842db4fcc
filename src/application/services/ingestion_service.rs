use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{
    DocumentExtractor, EmbeddingProvider, document_extractor::ExtractedDocument,
    embedding_provider::BatchEmbeddingRequest,
};
use crate::application::services::text_splitter::TextSplitter;
use crate::domain::entities::DocumentChunk;
use crate::domain::repositories::DocumentRepository;
use crate::domain::value_objects::{ChunkMetadata, DocumentType, FileHash};

pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 100;

#[derive(Debug)]
pub enum IngestionError {
    ExtractionError(String),
    EmptyDocument(String),
    EmbeddingError(String),
    RepositoryError(String),
}

impl std::fmt::Display for IngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionError::ExtractionError(msg) => write!(f, "Extraction error: {}", msg),
            IngestionError::EmptyDocument(name) => {
                write!(f, "No text could be extracted from {}", name)
            }
            IngestionError::EmbeddingError(msg) => write!(f, "Embedding error: {}", msg),
            IngestionError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for IngestionError {}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestedDocument {
    pub document_id: Uuid,
    pub chunks_created: usize,
}

/// Turns an uploaded file into embedded rows in the vector store.
pub struct DocumentIngestionService {
    document_extractor: Arc<dyn DocumentExtractor>,
    text_splitter: Arc<dyn TextSplitter>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    document_repository: Arc<dyn DocumentRepository>,
    batch_size: usize,
}

impl DocumentIngestionService {
    pub fn new(
        document_extractor: Arc<dyn DocumentExtractor>,
        text_splitter: Arc<dyn TextSplitter>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        document_repository: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            document_extractor,
            text_splitter,
            embedding_provider,
            document_repository,
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Batches are embedded and inserted one after another with no
    /// surrounding transaction; on failure earlier batches stay stored.
    pub async fn ingest(
        &self,
        file_name: &str,
        data: &[u8],
        document_type: DocumentType,
    ) -> Result<IngestedDocument, IngestionError> {
        let extracted = self
            .document_extractor
            .extract(data, document_type)
            .await
            .map_err(|e| IngestionError::ExtractionError(e.to_string()))?;

        if !extracted.has_text() {
            return Err(IngestionError::EmptyDocument(file_name.to_string()));
        }

        let document_id = Uuid::new_v4();
        let file_hash = FileHash::from_bytes(data);
        let chunks = self.create_chunks(file_name, document_type, document_id, &file_hash, &extracted);

        if chunks.is_empty() {
            return Err(IngestionError::EmptyDocument(file_name.to_string()));
        }

        tracing::info!(
            "Ingesting {} ({} pages) as {} chunks, document_id={}",
            file_name,
            extracted.page_count(),
            chunks.len(),
            document_id
        );

        let mut stored = 0;
        for batch in chunks.chunks(self.batch_size) {
            let embedded = self.embed_batch(batch).await?;

            stored += self
                .document_repository
                .save_batch(&embedded)
                .await
                .map_err(|e| IngestionError::RepositoryError(e.to_string()))?;

            tracing::debug!("Stored {}/{} chunks of {}", stored, chunks.len(), file_name);
        }

        Ok(IngestedDocument {
            document_id,
            chunks_created: stored,
        })
    }

    fn create_chunks(
        &self,
        file_name: &str,
        document_type: DocumentType,
        document_id: Uuid,
        file_hash: &FileHash,
        extracted: &ExtractedDocument,
    ) -> Vec<DocumentChunk> {
        let pieces: Vec<(Option<u32>, String)> = extracted
            .pages
            .iter()
            .flat_map(|page| {
                self.text_splitter
                    .split_text(&page.text)
                    .into_iter()
                    .map(move |text| (page.page_number, text))
            })
            .collect();

        let chunk_total = pieces.len();

        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, (page, text))| {
                let metadata = ChunkMetadata {
                    source: file_name.to_string(),
                    file_type: document_type.extension().to_string(),
                    page,
                    chunk_index,
                    chunk_total,
                    document_id,
                    file_hash: Some(file_hash.to_string()),
                };
                DocumentChunk::new(text, metadata)
            })
            .collect()
    }

    async fn embed_batch(&self, batch: &[DocumentChunk]) -> Result<Vec<DocumentChunk>, IngestionError> {
        let texts = batch.iter().map(|chunk| chunk.content().to_string()).collect();

        let response = self
            .embedding_provider
            .generate_embeddings(BatchEmbeddingRequest { texts })
            .await
            .map_err(|e| IngestionError::EmbeddingError(e.to_string()))?;

        if response.embeddings.len() != batch.len() {
            return Err(IngestionError::EmbeddingError(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                response.embeddings.len()
            )));
        }

        tracing::debug!(
            "Embedded {} chunks with {} ({} tokens)",
            batch.len(),
            response.model_name,
            response
                .total_tokens
                .map_or_else(|| "unreported".to_string(), |t| t.to_string())
        );

        Ok(batch
            .iter()
            .cloned()
            .zip(response.embeddings)
            .map(|(chunk, embedding)| chunk.with_embedding(embedding))
            .collect())
    }
}
