//! OpenAI Chat Completions adapter.
//!
//! Also serves Gemini through Google's OpenAI-compatible endpoint; the
//! two differ only in base URL, key and the max-tokens field name.

use super::http::{client, map_reqwest_error, parse_arguments, read_json};
use super::{ProviderAdapter, ProviderKind};
use crate::config::ProviderEndpoint;
use crate::tools::schema::parameters_schema;
use async_trait::async_trait;
use council_application::GatewayError;
use council_domain::{
    ContentBlock, LlmResponse, Message, ModelRequest, StopReason, TokenUsage, ToolDefinition,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

pub struct OpenAiAdapter {
    kind: ProviderKind,
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
}

impl OpenAiAdapter {
    pub fn new(endpoint: ProviderEndpoint) -> Result<Self, GatewayError> {
        Ok(Self {
            kind: ProviderKind::OpenAi,
            client: client()?,
            endpoint,
        })
    }

    /// Gemini via `generativelanguage.googleapis.com/.../openai`
    pub fn google(endpoint: ProviderEndpoint) -> Result<Self, GatewayError> {
        Ok(Self {
            kind: ProviderKind::Google,
            ..Self::new(endpoint)?
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.base_url.trim_end_matches('/'))
    }

    fn build_body(&self, request: &ModelRequest) -> ChatApiRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }
        for message in &request.messages {
            push_message(&mut messages, message);
        }

        // Newer OpenAI models reject `max_tokens`; the Gemini endpoint only knows it.
        let (max_tokens, max_completion_tokens) = match self.kind {
            ProviderKind::OpenAi => (None, Some(self.endpoint.max_tokens)),
            _ => (Some(self.endpoint.max_tokens), None),
        };

        ChatApiRequest {
            model: request.model.to_string(),
            messages,
            tools: request.tools.iter().map(function_tool).collect(),
            max_tokens,
            max_completion_tokens,
        }
    }
}

fn function_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": parameters_schema(tool),
        }
    })
}

fn push_message(out: &mut Vec<Value>, message: &Message) {
    match message {
        Message::User { text, images } if images.is_empty() => {
            out.push(json!({ "role": "user", "content": text }));
        }
        Message::User { text, images } => {
            let mut parts = vec![json!({ "type": "text", "text": text })];
            parts.extend(images.iter().map(|image| {
                json!({ "type": "image_url", "image_url": { "url": image.data_uri() } })
            }));
            out.push(json!({ "role": "user", "content": parts }));
        }
        Message::Assistant { text, tool_calls } => {
            let mut msg = json!({ "role": "assistant", "content": text });
            if !tool_calls.is_empty() {
                msg["tool_calls"] = tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.tool_name,
                                "arguments": call.arguments_json().to_string(),
                            }
                        })
                    })
                    .collect();
            }
            out.push(msg);
        }
        // One `tool` message per result.
        Message::ToolResults { results } => {
            out.extend(results.iter().map(|result| {
                json!({
                    "role": "tool",
                    "tool_call_id": result.tool_use_id,
                    "content": result.output,
                })
            }));
        }
    }
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
struct ChatApiRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ApiToolCall>,
}

#[derive(Deserialize)]
struct ApiToolCall {
    id: String,
    function: ApiFunction,
}

#[derive(Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl ChatApiResponse {
    fn into_response(self, provider: &str) -> Result<LlmResponse, GatewayError> {
        let choice = self.choices.into_iter().next().ok_or_else(|| {
            GatewayError::ProviderRejected(format!("{} returned no choices", provider))
        })?;

        let mut content = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            content.push(ContentBlock::text(text));
        }
        for call in choice.message.tool_calls {
            content.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input: parse_arguments(&call.function.arguments),
            });
        }

        let stop_reason = choice.finish_reason.map(|reason| match reason.as_str() {
            "stop" => StopReason::EndTurn,
            "tool_calls" => StopReason::ToolUse,
            "length" => StopReason::MaxTokens,
            _ => StopReason::Other(reason),
        });

        Ok(LlmResponse {
            content,
            stop_reason,
            usage: self
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
        })
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn send(&self, request: &ModelRequest) -> Result<LlmResponse, GatewayError> {
        let api_key = self
            .endpoint
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::MissingCredential(self.endpoint.api_key_env.clone()))?;

        let body = self.build_body(request);
        debug!(
            "{} request: model={} messages={} tools={}",
            self.kind,
            body.model,
            body.messages.len(),
            body.tools.len()
        );

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let parsed: ChatApiResponse = read_json(self.kind.as_str(), response).await?;
        parsed.into_response(self.kind.as_str())
    }
}
