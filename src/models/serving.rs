//! Wire format of the model serving endpoint (OpenAI-style chat completions).

use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingMessage {
    pub role: String,
    pub content: String,
}

/// Outbound payload: `{ "messages": [{ "role": "user", "content": ... }] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingRequest {
    pub messages: Vec<ServingMessage>,
}

impl ServingRequest {
    /// Single-turn request carrying one user message
    pub fn user_message(content: impl Into<String>) -> Self {
        Self {
            messages: vec![ServingMessage {
                role: ROLE_USER.to_string(),
                content: content.into(),
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServingResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

impl ServingResponse {
    /// Content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}
