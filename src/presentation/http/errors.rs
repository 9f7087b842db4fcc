use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::use_cases::ask_question::AskQuestionError;
use crate::application::use_cases::get_collection_stats::CollectionStatsError;
use crate::application::use_cases::list_documents::ListDocumentsError;
use crate::application::use_cases::upload_document::UploadDocumentError;
use crate::domain::value_objects::DocumentType;

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest { error: String, detail: String },
    PayloadTooLarge(String),
    NotFound(String),
    Upstream { error: String, detail: String },
}

impl ApiError {
    pub fn bad_request(error: &str, detail: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error: error.to_string(),
            detail: detail.into(),
        }
    }

    pub fn upstream(error: &str, detail: impl Into<String>) -> Self {
        ApiError::Upstream {
            error: error.to_string(),
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest { error, detail } => ErrorBody { error, detail },
            ApiError::PayloadTooLarge(detail) => ErrorBody {
                error: "File too large".to_string(),
                detail,
            },
            ApiError::NotFound(detail) => ErrorBody {
                error: "Endpoint not found".to_string(),
                detail,
            },
            ApiError::Upstream { error, detail } => {
                tracing::error!("{}: {}", error, detail);
                ErrorBody { error, detail }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<UploadDocumentError> for ApiError {
    fn from(error: UploadDocumentError) -> Self {
        match error {
            UploadDocumentError::ValidationError(msg) => ApiError::bad_request("Invalid upload", msg),
            UploadDocumentError::UnsupportedFileType(_) => ApiError::bad_request(
                "Invalid file type",
                format!("Allowed types: {}", DocumentType::allowed_extensions()),
            ),
            UploadDocumentError::FileTooLarge { .. } => ApiError::PayloadTooLarge(error.to_string()),
            UploadDocumentError::ProcessingError(msg) => {
                ApiError::bad_request("Document processing error", msg)
            }
            UploadDocumentError::UpstreamError(msg) => {
                ApiError::upstream("Failed to process document", msg)
            }
        }
    }
}

impl From<AskQuestionError> for ApiError {
    fn from(error: AskQuestionError) -> Self {
        match error {
            AskQuestionError::ValidationError(msg) => ApiError::bad_request("Invalid question", msg),
            AskQuestionError::UpstreamError(msg) => {
                ApiError::upstream("Failed to process question", msg)
            }
        }
    }
}

impl From<CollectionStatsError> for ApiError {
    fn from(error: CollectionStatsError) -> Self {
        ApiError::upstream("Failed to get stats", error.to_string())
    }
}

impl From<ListDocumentsError> for ApiError {
    fn from(error: ListDocumentsError) -> Self {
        ApiError::upstream("Failed to list documents", error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_errors_map_to_status() {
        let cases = [
            (
                UploadDocumentError::UnsupportedFileType("a.exe".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                UploadDocumentError::FileTooLarge { size: 11, limit: 10 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                UploadDocumentError::ProcessingError("no text".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                UploadDocumentError::UpstreamError("db down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn test_invalid_type_lists_allowed_extensions() {
        let error = ApiError::from(UploadDocumentError::UnsupportedFileType("a.exe".to_string()));
        match error {
            ApiError::BadRequest { error, detail } => {
                assert_eq!(error, "Invalid file type");
                assert!(detail.contains(".pdf, .docx, .doc, .txt"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
