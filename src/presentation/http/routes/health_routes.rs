use axum::{Json, Router, http::Uri, response::IntoResponse, routing::get};

use crate::presentation::http::dto::{HealthResponseDto, WelcomeResponseDto};
use crate::presentation::http::errors::ApiError;

pub fn health_routes() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

async fn root_handler() -> impl IntoResponse {
    Json(WelcomeResponseDto::default())
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponseDto {
        status: "healthy".to_string(),
        message: "AI Document Assistant API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("The endpoint {} does not exist", uri.path()))
}
