use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::application::ports::chat_provider::{
    ChatMessage, ChatProvider, ChatProviderError, ChatRequest, ChatResponse, ChatRole,
    ToolChoice, ToolDefinition, ToolInvocation,
};
use crate::infrastructure::external_services::endpoint_url;

#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            model: "openai/gpt-4.1-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: ChatRole,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments object.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: function_type(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

impl From<&ToolDefinition> for WireTool {
    fn from(definition: &ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: definition.name.clone(),
                description: definition.description.clone(),
                parameters: definition.parameters.clone(),
            },
        }
    }
}

impl From<WireToolCall> for ToolInvocation {
    fn from(call: WireToolCall) -> Self {
        let arguments = match serde_json::from_str(&call.function.arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                tracing::warn!(
                    "Tool call {} sent invalid arguments {:?}, using {{}}: {}",
                    call.function.name,
                    call.function.arguments,
                    e
                );
                Value::Object(Default::default())
            }
        };

        Self {
            id: call.id,
            name: call.function.name,
            arguments,
        }
    }
}

impl TryFrom<CompletionResponse> for ChatResponse {
    type Error = ChatProviderError;

    fn try_from(response: CompletionResponse) -> Result<Self, Self::Error> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ChatProviderError::EmptyResponse)?;

        Ok(ChatResponse {
            content: choice.message.content,
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(ToolInvocation::from)
                .collect(),
            total_tokens: response.usage.map(|u| u.total_tokens),
        })
    }
}

/// Chat completions against an OpenAI-compatible API (OpenRouter by default).
pub struct OpenRouterChatProvider {
    client: Client,
    endpoint: Url,
    config: ChatClientConfig,
}

impl OpenRouterChatProvider {
    pub fn new(config: ChatClientConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = endpoint_url(&config.api_url, "chat/completions")?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    fn build_request<'a>(&'a self, request: &ChatRequest) -> CompletionRequest<'a> {
        let tools: Vec<WireTool> = request.tools.iter().map(WireTool::from).collect();
        let tool_choice = (!tools.is_empty()).then_some(request.tool_choice);

        CompletionRequest {
            model: &self.config.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: self.config.temperature,
            tools,
            tool_choice,
        }
    }
}

#[async_trait]
impl ChatProvider for OpenRouterChatProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ChatProviderError> {
        let body = self.build_request(&request);

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => return Err(ChatProviderError::RateLimitExceeded),
            StatusCode::SERVICE_UNAVAILABLE => return Err(ChatProviderError::ServiceUnavailable),
            _ if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(ChatProviderError::ApiError(format!("{}: {}", status, text)));
            }
            _ => {}
        }

        let completion = response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| ChatProviderError::ApiError(e.to_string()))?;

        ChatResponse::try_from(completion)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
