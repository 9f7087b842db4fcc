use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{AskQuestionUseCase, ask_question::AskQuestionRequest};
use crate::presentation::http::dto::{
    AskRequestDto, AskResponseDto, ServiceHealthDto, SimpleAnswerDto, SimpleAskQuery,
};
use crate::presentation::http::errors::ApiError;

pub struct AskHandler {
    ask_use_case: Arc<AskQuestionUseCase>,
}

impl AskHandler {
    pub fn new(ask_use_case: Arc<AskQuestionUseCase>) -> Self {
        Self { ask_use_case }
    }

    pub async fn ask(
        State(handler): State<Arc<AskHandler>>,
        payload: Result<Json<AskRequestDto>, JsonRejection>,
    ) -> Result<impl IntoResponse, ApiError> {
        let Json(dto) =
            payload.map_err(|e| ApiError::bad_request("Invalid request", e.body_text()))?;

        let answer = handler
            .ask_use_case
            .execute(AskQuestionRequest::from(dto))
            .await?;

        tracing::info!(
            "Answered with {} chunks and {} tool calls",
            answer.retrieved_chunks.len(),
            answer.tool_calls.len()
        );

        Ok(Json(AskResponseDto::from(answer)))
    }

    /// Question from the query string, default settings, whole collection.
    pub async fn ask_simple(
        State(handler): State<Arc<AskHandler>>,
        query: Result<Query<SimpleAskQuery>, QueryRejection>,
    ) -> Result<impl IntoResponse, ApiError> {
        let Query(query) =
            query.map_err(|e| ApiError::bad_request("Invalid request", e.body_text()))?;

        let answer = handler
            .ask_use_case
            .execute(AskQuestionRequest::simple(query.question))
            .await?;

        Ok(Json(SimpleAnswerDto {
            answer: answer.answer,
        }))
    }

    pub async fn health() -> impl IntoResponse {
        Json(ServiceHealthDto {
            status: "healthy".to_string(),
            service: "ask".to_string(),
        })
    }
}
