//! A single request to a model gateway

use super::message::Message;
use crate::core::model_id::ModelId;
use crate::tool::entities::ToolDefinition;

/// Everything a gateway needs for one request/response round.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: ModelId,
    pub system_prompt: Option<String>,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

impl ModelRequest {
    pub fn new(model: ModelId, messages: Vec<Message>) -> Self {
        Self {
            model,
            system_prompt: None,
            messages,
            tools: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn has_images(&self) -> bool {
        self.messages.iter().any(|m| m.has_images())
    }
}
