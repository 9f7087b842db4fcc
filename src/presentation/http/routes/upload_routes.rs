use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::UploadHandler;

/// The upload handler enforces its own size limit while streaming the file.
pub fn upload_routes(upload_handler: Arc<UploadHandler>) -> Router {
    Router::new()
        .route("/upload", post(UploadHandler::upload_document))
        .route("/upload/", post(UploadHandler::upload_document))
        .layer(DefaultBodyLimit::disable())
        .route("/upload/stats", get(UploadHandler::collection_stats))
        .route("/upload/list-documents", get(UploadHandler::list_documents))
        .with_state(upload_handler)
}
