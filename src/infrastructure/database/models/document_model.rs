use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Jsonb, Nullable, Text};
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::entities::{DocumentChunk, RetrievedChunk};
use crate::domain::repositories::DocumentSummary;
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub id: Uuid,
    pub content: String,
    pub metadata: serde_json::Value,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
}

impl From<&DocumentChunk> for NewDocumentModel {
    fn from(chunk: &DocumentChunk) -> Self {
        Self {
            id: chunk.id(),
            content: chunk.content().to_string(),
            metadata: chunk.metadata().to_json(),
            embedding: chunk.embedding().cloned(),
            created_at: chunk.created_at(),
        }
    }
}

/// Row returned by the `match_documents` SQL function.
#[derive(Debug, QueryableByName)]
pub struct MatchedDocumentRow {
    #[diesel(sql_type = Text)]
    pub content: String,
    #[diesel(sql_type = Jsonb)]
    pub metadata: serde_json::Value,
    #[diesel(sql_type = Double)]
    pub similarity: f64,
}

impl From<MatchedDocumentRow> for RetrievedChunk {
    fn from(row: MatchedDocumentRow) -> Self {
        RetrievedChunk::new(row.content, row.metadata, row.similarity)
    }
}

#[derive(Debug, QueryableByName)]
pub struct DocumentSummaryRow {
    #[diesel(sql_type = Text)]
    pub filename: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub document_id: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub file_type: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub chunk_count: i64,
}

impl From<DocumentSummaryRow> for DocumentSummary {
    fn from(row: DocumentSummaryRow) -> Self {
        DocumentSummary {
            filename: row.filename,
            document_id: row.document_id,
            file_type: row.file_type,
            chunk_count: row.chunk_count,
        }
    }
}
