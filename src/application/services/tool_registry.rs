use serde_json::{Value, json};

use crate::application::ports::chat_provider::ToolDefinition;

pub const FETCH_COMPANY_POLICY: &str = "fetch_company_policy";

const POLICIES: [(&str, &str); 4] = [
    ("refund", "Our refund policy allows returns within 30 days."),
    ("vacation", "Employees get 15 days paid vacation."),
    ("remote_work", "Remote work allowed 3 days a week."),
    ("expenses", "Expenses must be submitted within 30 days."),
];

/// Fixed set of functions the model may call while answering. Only the
/// canned company-policy lookup is registered.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry;

impl ToolRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: FETCH_COMPANY_POLICY.to_string(),
            description: "Fetch a specific company policy".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "policy_name": {
                        "type": "string",
                        "enum": POLICIES.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
                        "description": "Name of the policy to look up"
                    }
                },
                "required": ["policy_name"]
            }),
        }]
    }

    /// Runs a tool by name. Unknown tools and bad arguments produce a message
    /// for the model rather than an error, so the conversation can continue.
    pub fn call(&self, tool_name: &str, arguments: &Value) -> String {
        match tool_name {
            FETCH_COMPANY_POLICY => match arguments.get("policy_name").and_then(Value::as_str) {
                Some(policy_name) => fetch_company_policy(policy_name),
                None => "Error calling tool: missing argument 'policy_name'".to_string(),
            },
            _ => format!("Tool '{}' not found", tool_name),
        }
    }
}

fn fetch_company_policy(policy_name: &str) -> String {
    let key = policy_name.trim().to_lowercase();
    POLICIES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, text)| text.to_string())
        .unwrap_or_else(|| format!("Policy '{}' not found.", policy_name))
}
