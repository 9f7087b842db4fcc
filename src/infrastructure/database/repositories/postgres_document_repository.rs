use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Jsonb};
use pgvector::Vector;

use crate::domain::entities::{DocumentChunk, RetrievedChunk};
use crate::domain::repositories::{
    DocumentRepository, DocumentSummary, document_repository::DocumentRepositoryError,
};
use crate::domain::value_objects::MetadataFilter;
use crate::infrastructure::database::models::{
    DocumentSummaryRow, MatchedDocumentRow, NewDocumentModel,
};
use crate::infrastructure::database::schema::documents::dsl::*;
use crate::infrastructure::database::{DatabaseError, DbPool, with_connection};

const DOCUMENTS_TABLE: &str = "documents";

const MATCH_DOCUMENTS_SQL: &str = "SELECT id, content, metadata, similarity FROM match_documents($1, $2, $3)";

/// One row per source, newest upload first. Chunk metadata of a single
/// upload is identical apart from position, so any row stands in for it.
const LIST_DOCUMENTS_SQL: &str = "\
SELECT metadata->>'source' AS filename,
       (array_agg(metadata->>'document_id' ORDER BY created_at DESC))[1] AS document_id,
       (array_agg(metadata->>'file_type' ORDER BY created_at DESC))[1] AS file_type,
       COUNT(*) AS chunk_count
FROM documents
WHERE metadata ? 'source'
GROUP BY metadata->>'source'
ORDER BY MAX(created_at) DESC";

pub struct PostgresDocumentRepository {
    pool: DbPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn repository_error(error: DatabaseError) -> DocumentRepositoryError {
    DocumentRepositoryError::DatabaseError(error.to_string())
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn save_batch(&self, chunks: &[DocumentChunk]) -> Result<usize, DocumentRepositoryError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        if let Some(chunk) = chunks.iter().find(|c| !c.has_embedding()) {
            return Err(DocumentRepositoryError::ValidationError(format!(
                "chunk {} has no embedding",
                chunk.id()
            )));
        }

        let rows: Vec<NewDocumentModel> = chunks.iter().map(NewDocumentModel::from).collect();

        with_connection(&self.pool, move |conn| {
            diesel::insert_into(documents).values(&rows).execute(conn)
        })
        .await
        .map_err(repository_error)
    }

    async fn match_documents(
        &self,
        query_vector: &Vector,
        match_count: i32,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievedChunk>, DocumentRepositoryError> {
        let query_vector = query_vector.clone();
        let filter_json = filter
            .map(MetadataFilter::to_json)
            .unwrap_or_else(|| serde_json::json!({}));

        let rows = with_connection(&self.pool, move |conn| {
            sql_query(MATCH_DOCUMENTS_SQL)
                .bind::<pgvector::sql_types::Vector, _>(query_vector)
                .bind::<Integer, _>(match_count)
                .bind::<Jsonb, _>(filter_json)
                .load::<MatchedDocumentRow>(conn)
        })
        .await
        .map_err(repository_error)?;

        Ok(rows.into_iter().map(RetrievedChunk::from).collect())
    }

    async fn count(&self) -> Result<i64, DocumentRepositoryError> {
        with_connection(&self.pool, |conn| documents.count().get_result::<i64>(conn))
            .await
            .map_err(repository_error)
    }

    fn table_name(&self) -> &str {
        DOCUMENTS_TABLE
    }

    async fn latest_source(&self) -> Result<Option<String>, DocumentRepositoryError> {
        let latest = with_connection(&self.pool, |conn| {
            documents
                .select(metadata)
                .order(created_at.desc())
                .first::<serde_json::Value>(conn)
                .optional()
        })
        .await
        .map_err(repository_error)?;

        Ok(latest.and_then(|value| {
            value
                .get("source")
                .and_then(|source| source.as_str())
                .map(str::to_string)
        }))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, DocumentRepositoryError> {
        let rows = with_connection(&self.pool, |conn| {
            sql_query(LIST_DOCUMENTS_SQL).load::<DocumentSummaryRow>(conn)
        })
        .await
        .map_err(repository_error)?;

        Ok(rows.into_iter().map(DocumentSummary::from).collect())
    }
}
