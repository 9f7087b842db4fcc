use serde::Serialize;

use crate::application::use_cases::get_collection_stats::CollectionStats;
use crate::application::use_cases::list_documents::ListDocumentsResponse;
use crate::application::use_cases::upload_document::UploadDocumentResponse;
use crate::domain::repositories::DocumentSummary;

#[derive(Debug, Serialize)]
pub struct UploadResponseDto {
    pub message: String,
    pub filename: String,
    pub chunks_created: usize,
    pub document_id: String,
}

impl From<UploadDocumentResponse> for UploadResponseDto {
    fn from(response: UploadDocumentResponse) -> Self {
        Self {
            message: "Document uploaded successfully".to_string(),
            filename: response.file_name,
            chunks_created: response.chunks_created,
            document_id: response.document_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionStatsDto {
    pub total_documents: i64,
    pub table_name: String,
}

impl From<CollectionStats> for CollectionStatsDto {
    fn from(stats: CollectionStats) -> Self {
        Self {
            total_documents: stats.total_documents,
            table_name: stats.table_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentSummaryDto {
    pub filename: String,
    pub document_id: Option<String>,
    pub file_type: Option<String>,
    pub chunk_count: i64,
}

impl From<DocumentSummary> for DocumentSummaryDto {
    fn from(summary: DocumentSummary) -> Self {
        Self {
            filename: summary.filename,
            document_id: summary.document_id,
            file_type: summary.file_type,
            chunk_count: summary.chunk_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentListDto {
    pub total_chunks: i64,
    pub unique_documents: usize,
    pub documents: Vec<DocumentSummaryDto>,
}

impl From<ListDocumentsResponse> for DocumentListDto {
    fn from(response: ListDocumentsResponse) -> Self {
        Self {
            total_chunks: response.total_chunks,
            unique_documents: response.unique_documents,
            documents: response
                .documents
                .into_iter()
                .map(DocumentSummaryDto::from)
                .collect(),
        }
    }
}
