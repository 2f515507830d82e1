use serde::{Deserialize, Serialize};

use crate::models::{LLMModel, LLMModelConfig};
use crate::templates::TemplateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry of the chat history. `content` is forwarded to the provider
/// untouched, so multi-part (text + image) payloads survive the trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreMessage {
    pub role: MessageRole,
    pub content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<CoreMessage>,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub template: TemplateId,
    pub model: LLMModel,
    #[serde(default)]
    pub config: LLMModelConfig,
}
