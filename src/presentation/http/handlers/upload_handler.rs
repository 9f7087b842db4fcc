use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{
    GetCollectionStatsUseCase, ListDocumentsUseCase, UploadDocumentUseCase,
    upload_document::{UploadDocumentError, UploadDocumentRequest},
};
use crate::presentation::http::dto::{CollectionStatsDto, DocumentListDto, UploadResponseDto};
use crate::presentation::http::errors::ApiError;

const FILE_FIELD: &str = "file";

pub struct UploadHandler {
    upload_use_case: Arc<UploadDocumentUseCase>,
    stats_use_case: Arc<GetCollectionStatsUseCase>,
    list_documents_use_case: Arc<ListDocumentsUseCase>,
}

impl UploadHandler {
    pub fn new(
        upload_use_case: Arc<UploadDocumentUseCase>,
        stats_use_case: Arc<GetCollectionStatsUseCase>,
        list_documents_use_case: Arc<ListDocumentsUseCase>,
    ) -> Self {
        Self {
            upload_use_case,
            stats_use_case,
            list_documents_use_case,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.upload_use_case.max_upload_bytes()
    }

    pub async fn upload_document(
        State(handler): State<Arc<UploadHandler>>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, ApiError> {
        let limit = handler.max_upload_bytes();

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            UploadDocumentUseCase::document_type_for(&file_name)?;

            // Stop reading as soon as the file is known to be too large.
            let mut file_data = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                if file_data.len() + chunk.len() > limit {
                    return Err(UploadDocumentError::FileTooLarge {
                        size: file_data.len() + chunk.len(),
                        limit,
                    }
                    .into());
                }
                file_data.extend_from_slice(&chunk);
            }

            tracing::info!("Received upload {} ({} bytes)", file_name, file_data.len());

            let response = handler
                .upload_use_case
                .execute(UploadDocumentRequest {
                    file_name,
                    file_data,
                })
                .await?;

            return Ok((StatusCode::CREATED, Json(UploadResponseDto::from(response))));
        }

        Err(ApiError::bad_request(
            "No file provided",
            format!("Expected a multipart field named '{}'", FILE_FIELD),
        ))
    }

    pub async fn collection_stats(
        State(handler): State<Arc<UploadHandler>>,
    ) -> Result<impl IntoResponse, ApiError> {
        let stats = handler.stats_use_case.execute().await?;
        Ok(Json(CollectionStatsDto::from(stats)))
    }

    pub async fn list_documents(
        State(handler): State<Arc<UploadHandler>>,
    ) -> Result<impl IntoResponse, ApiError> {
        let documents = handler.list_documents_use_case.execute().await?;
        Ok(Json(DocumentListDto::from(documents)))
    }
}

fn multipart_error(error: MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(error.body_text())
    } else {
        ApiError::bad_request("Invalid upload", error.body_text())
    }
}
