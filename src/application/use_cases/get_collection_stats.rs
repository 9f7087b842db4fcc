use std::sync::Arc;

use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};

#[derive(Debug)]
pub enum CollectionStatsError {
    RepositoryError(String),
}

impl std::fmt::Display for CollectionStatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionStatsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for CollectionStatsError {}

impl From<DocumentRepositoryError> for CollectionStatsError {
    fn from(error: DocumentRepositoryError) -> Self {
        CollectionStatsError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStats {
    pub total_documents: i64,
    pub table_name: String,
}

pub struct GetCollectionStatsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl GetCollectionStatsUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self { document_repository }
    }

    pub async fn execute(&self) -> Result<CollectionStats, CollectionStatsError> {
        let total_documents = self.document_repository.count().await?;

        Ok(CollectionStats {
            total_documents,
            table_name: self.document_repository.table_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{FakeEmbeddingProvider, InMemoryDocumentRepository};
    use crate::domain::entities::DocumentChunk;
    use crate::domain::value_objects::ChunkMetadata;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_stats_report_row_count_and_backing_table() {
        let repository = Arc::new(InMemoryDocumentRepository::new());
        let document_id = Uuid::new_v4();
        for chunk_index in 0..3 {
            let metadata = ChunkMetadata {
                source: "notes.txt".to_string(),
                file_type: ".txt".to_string(),
                page: None,
                chunk_index,
                chunk_total: 3,
                document_id,
                file_hash: None,
            };
            repository.rows.lock().unwrap().push(
                DocumentChunk::new(format!("chunk {}", chunk_index), metadata)
                    .with_embedding(FakeEmbeddingProvider::embed("chunk")),
            );
        }

        let stats = GetCollectionStatsUseCase::new(repository).execute().await.unwrap();

        assert_eq!(
            stats,
            CollectionStats {
                total_documents: 3,
                table_name: "documents".to_string(),
            }
        );
    }
}
