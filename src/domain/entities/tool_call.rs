use serde::{Deserialize, Serialize};

/// Record of one tool the model invoked while answering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub result: Option<String>,
}

impl ToolCall {
    pub fn new(tool_name: String, arguments: serde_json::Value, result: String) -> Self {
        Self {
            tool_name,
            arguments,
            result: Some(result),
        }
    }
}
