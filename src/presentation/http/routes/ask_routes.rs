use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::AskHandler;

pub fn ask_routes(ask_handler: Arc<AskHandler>) -> Router {
    Router::new()
        .route("/ask", post(AskHandler::ask))
        .route("/ask/", post(AskHandler::ask))
        .route("/ask/simple", post(AskHandler::ask_simple))
        .route("/ask/health", get(AskHandler::health))
        .with_state(ask_handler)
}
