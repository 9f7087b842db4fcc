use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Serialize)]
pub struct HealthResponseDto {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealthDto {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponseDto {
    pub message: String,
    pub version: String,
    pub description: String,
    pub health: String,
    pub endpoints: Value,
}

impl Default for WelcomeResponseDto {
    fn default() -> Self {
        Self {
            message: "Welcome to AI Document Assistant API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "A RAG-powered document question answering system".to_string(),
            health: "/health".to_string(),
            endpoints: json!({
                "upload": "/upload/",
                "ask": "/ask/",
                "stats": "/upload/stats",
                "list_documents": "/upload/list-documents",
            }),
        }
    }
}
