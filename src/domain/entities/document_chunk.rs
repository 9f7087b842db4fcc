use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::ChunkMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    id: Uuid,
    content: String,
    metadata: ChunkMetadata,
    embedding: Option<Vector>,
    created_at: DateTime<Utc>,
}

impl DocumentChunk {
    pub fn new(content: String, metadata: ChunkMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            metadata,
            embedding: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vector) -> Self {
        self.embedding = Some(embedding);
        self
    }

    // Getters
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &ChunkMetadata {
        &self.metadata
    }

    pub fn embedding(&self) -> Option<&Vector> {
        self.embedding.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    pub fn character_count(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ChunkMetadata {
        ChunkMetadata {
            source: "guide.txt".to_string(),
            file_type: ".txt".to_string(),
            page: None,
            chunk_index: 0,
            chunk_total: 1,
            document_id: Uuid::new_v4(),
            file_hash: None,
        }
    }

    #[test]
    fn test_chunk_creation() {
        let chunk = DocumentChunk::new("Refunds are accepted for 30 days.".to_string(), metadata());

        assert!(!chunk.is_empty());
        assert!(!chunk.has_embedding());
        assert_eq!(chunk.metadata().source, "guide.txt");
        assert_eq!(chunk.character_count(), 33);
    }

    #[test]
    fn test_attach_embedding() {
        let chunk = DocumentChunk::new("text".to_string(), metadata())
            .with_embedding(Vector::from(vec![0.1, 0.2, 0.3]));

        assert!(chunk.has_embedding());
        assert_eq!(chunk.embedding().unwrap().as_slice().len(), 3);
    }

    #[test]
    fn test_whitespace_only_chunk_is_empty() {
        let chunk = DocumentChunk::new(" \n\t ".to_string(), metadata());
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_character_count_is_unicode_aware() {
        let chunk = DocumentChunk::new("héllo".to_string(), metadata());
        assert_eq!(chunk.character_count(), 5);
    }
}
