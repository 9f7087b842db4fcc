use std::sync::Arc;

use crate::domain::repositories::{
    DocumentRepository, DocumentSummary, document_repository::DocumentRepositoryError,
};

#[derive(Debug)]
pub enum ListDocumentsError {
    RepositoryError(String),
}

impl std::fmt::Display for ListDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListDocumentsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ListDocumentsError {}

impl From<DocumentRepositoryError> for ListDocumentsError {
    fn from(error: DocumentRepositoryError) -> Self {
        ListDocumentsError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ListDocumentsResponse {
    pub total_chunks: i64,
    pub unique_documents: usize,
    pub documents: Vec<DocumentSummary>,
}

pub struct ListDocumentsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl ListDocumentsUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self {
            document_repository,
        }
    }

    pub async fn execute(&self) -> Result<ListDocumentsResponse, ListDocumentsError> {
        let documents = self.document_repository.list_documents().await?;
        let total_chunks = documents.iter().map(|d| d.chunk_count).sum();

        Ok(ListDocumentsResponse {
            total_chunks,
            unique_documents: documents.len(),
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::InMemoryDocumentRepository;
    use crate::domain::entities::DocumentChunk;
    use crate::domain::value_objects::ChunkMetadata;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_groups_chunks_by_source_newest_first() {
        let repository = Arc::new(InMemoryDocumentRepository::new());
        {
            let mut rows = repository.rows.lock().unwrap();
            for (source, count) in [("a.pdf", 3), ("b.txt", 2)] {
                let document_id = Uuid::new_v4();
                for chunk_index in 0..count {
                    let metadata = ChunkMetadata {
                        source: source.to_string(),
                        file_type: if source.ends_with(".pdf") { ".pdf" } else { ".txt" }.to_string(),
                        page: None,
                        chunk_index,
                        chunk_total: count,
                        document_id,
                        file_hash: None,
                    };
                    rows.push(DocumentChunk::new("text".to_string(), metadata));
                }
            }
        }

        let response = ListDocumentsUseCase::new(repository).execute().await.unwrap();

        assert_eq!(response.total_chunks, 5);
        assert_eq!(response.unique_documents, 2);
        assert_eq!(response.documents[0].filename, "b.txt");
        assert_eq!(response.documents[0].chunk_count, 2);
        assert_eq!(response.documents[1].file_type.as_deref(), Some(".pdf"));
    }
}
