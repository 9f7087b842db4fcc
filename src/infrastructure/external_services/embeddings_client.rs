use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
    EmbeddingResponse,
};
use crate::infrastructure::external_services::endpoint_url;

#[derive(Debug, Serialize)]
pub struct EmbeddingsRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingsResponse {
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<EmbeddingsUsage>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingsUsage {
    #[serde(default)]
    pub total_tokens: i32,
}

#[derive(Debug, Clone)]
pub struct EmbeddingsClientConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingsClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug)]
pub enum EmbeddingsError {
    RequestError(String),
    StatusError(StatusCode, String),
    ParseError(String),
}

impl From<EmbeddingsError> for EmbeddingProviderError {
    fn from(error: EmbeddingsError) -> Self {
        match error {
            EmbeddingsError::RequestError(msg) => EmbeddingProviderError::NetworkError(msg),
            EmbeddingsError::StatusError(StatusCode::TOO_MANY_REQUESTS, _) => {
                EmbeddingProviderError::RateLimitExceeded
            }
            EmbeddingsError::StatusError(StatusCode::SERVICE_UNAVAILABLE, _) => {
                EmbeddingProviderError::ServiceUnavailable
            }
            EmbeddingsError::StatusError(status, body) => {
                EmbeddingProviderError::ApiError(format!("{}: {}", status, body))
            }
            EmbeddingsError::ParseError(msg) => EmbeddingProviderError::ApiError(msg),
        }
    }
}

/// Client for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingsClient {
    client: Client,
    endpoint: Url,
    config: EmbeddingsClientConfig,
}

impl EmbeddingsClient {
    pub fn new(config: EmbeddingsClientConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = endpoint_url(&config.api_url, "embeddings")?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// The `dimensions` parameter is only understood by the v3 model family.
    fn requested_dimensions(&self) -> Option<usize> {
        self.config
            .model
            .contains("text-embedding-3")
            .then_some(self.config.dimension)
    }

    pub async fn embed(&self, texts: &[String]) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let request = EmbeddingsRequest {
            model: &self.config.model,
            input: texts,
            dimensions: self.requested_dimensions(),
        };

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e: ReqwestError| EmbeddingsError::RequestError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingsError::StatusError(status, body));
        }

        let mut parsed = response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingsError::ParseError(e.to_string()))?;
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed)
    }
}

pub struct OpenAiEmbeddingProvider {
    client: EmbeddingsClient,
}

impl OpenAiEmbeddingProvider {
    pub fn new(client: EmbeddingsClient) -> Self {
        Self { client }
    }
}

/// One vector per input, in input order. Width is left to the `VECTOR`
/// column to enforce.
fn to_vectors(
    response: EmbeddingsResponse,
    expected: usize,
) -> Result<Vec<Vector>, EmbeddingProviderError> {
    if response.data.len() != expected {
        return Err(EmbeddingProviderError::ApiError(format!(
            "expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    Ok(response
        .data
        .into_iter()
        .map(|data| Vector::from(data.embedding))
        .collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn generate_embedding(
        &self,
        text: &str,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        if text.trim().is_empty() {
            return Err(EmbeddingProviderError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let response = self.client.embed(&[text.to_string()]).await?;
        let model_name = response
            .model
            .clone()
            .unwrap_or_else(|| self.model_name().to_string());
        let token_count = response.usage.as_ref().map(|u| u.total_tokens);

        let embedding = to_vectors(response, 1)?
            .pop()
            .ok_or_else(|| EmbeddingProviderError::ApiError("No embeddings returned".to_string()))?;

        Ok(EmbeddingResponse {
            embedding,
            model_name,
            token_count,
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        if request.texts.is_empty() {
            return Ok(BatchEmbeddingResponse {
                embeddings: Vec::new(),
                model_name: self.model_name().to_string(),
                total_tokens: None,
            });
        }

        let response = self.client.embed(&request.texts).await?;
        let model_name = response
            .model
            .clone()
            .unwrap_or_else(|| self.model_name().to_string());
        let total_tokens = response.usage.as_ref().map(|u| u.total_tokens);

        Ok(BatchEmbeddingResponse {
            embeddings: to_vectors(response, request.texts.len())?,
            model_name,
            total_tokens,
        })
    }

    fn model_name(&self) -> &str {
        &self.client.config.model
    }

    fn embedding_dimension(&self) -> usize {
        self.client.config.dimension
    }
}
