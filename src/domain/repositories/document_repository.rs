use async_trait::async_trait;
use pgvector::Vector;

use crate::domain::entities::{DocumentChunk, RetrievedChunk};
use crate::domain::value_objects::MetadataFilter;

#[derive(Debug)]
pub enum DocumentRepositoryError {
    DatabaseError(String),
    ValidationError(String),
}

impl std::fmt::Display for DocumentRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            DocumentRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for DocumentRepositoryError {}

/// One uploaded document as seen through the chunk table: chunks grouped by
/// their `source` metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub filename: String,
    pub document_id: Option<String>,
    pub file_type: Option<String>,
    pub chunk_count: i64,
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts embedded chunks. Returns the number of rows written.
    async fn save_batch(&self, chunks: &[DocumentChunk]) -> Result<usize, DocumentRepositoryError>;

    /// Nearest neighbours of `query_vector` by cosine distance, best first,
    /// restricted to rows whose metadata contains `filter`.
    async fn match_documents(
        &self,
        query_vector: &Vector,
        match_count: i32,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievedChunk>, DocumentRepositoryError>;

    async fn count(&self) -> Result<i64, DocumentRepositoryError>;

    /// Name of the table the chunks live in.
    fn table_name(&self) -> &str;

    /// `source` of the most recently inserted chunk.
    async fn latest_source(&self) -> Result<Option<String>, DocumentRepositoryError>;

    /// Documents newest first.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, DocumentRepositoryError>;
}
