//! Anthropic Messages API adapter

use super::http::{client, map_reqwest_error, read_json};
use super::{ProviderAdapter, ProviderKind};
use crate::config::ProviderEndpoint;
use crate::tools::schema::parameters_schema;
use async_trait::async_trait;
use council_application::GatewayError;
use council_domain::{ContentBlock, LlmResponse, Message, ModelRequest, StopReason, TokenUsage};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::debug;

pub struct AnthropicAdapter {
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
    api_version: String,
}

impl AnthropicAdapter {
    pub fn new(endpoint: ProviderEndpoint, api_version: impl Into<String>) -> Result<Self, GatewayError> {
        Ok(Self {
            client: client()?,
            endpoint,
            api_version: api_version.into(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.endpoint.base_url.trim_end_matches('/'))
    }

    fn build_body(&self, request: &ModelRequest) -> MessagesApiRequest {
        MessagesApiRequest {
            model: request.model.to_string(),
            max_tokens: self.endpoint.max_tokens,
            system: request.system_prompt.clone(),
            messages: request.messages.iter().map(api_message).collect(),
            tools: request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": parameters_schema(tool),
                    })
                })
                .collect(),
        }
    }
}

fn api_message(message: &Message) -> Value {
    match message {
        Message::User { text, images } => {
            let mut blocks: Vec<Value> = images
                .iter()
                .map(|image| {
                    json!({
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": image.media_type,
                            "data": image.data,
                        }
                    })
                })
                .collect();
            blocks.push(json!({ "type": "text", "text": text }));
            json!({ "role": "user", "content": blocks })
        }
        Message::Assistant { text, tool_calls } => {
            let mut blocks = Vec::new();
            if !text.is_empty() {
                blocks.push(json!({ "type": "text", "text": text }));
            }
            blocks.extend(tool_calls.iter().map(|call| {
                json!({
                    "type": "tool_use",
                    "id": call.id,
                    "name": call.tool_name,
                    "input": call.arguments_json(),
                })
            }));
            json!({ "role": "assistant", "content": blocks })
        }
        Message::ToolResults { results } => {
            let blocks: Vec<Value> = results
                .iter()
                .map(|result| {
                    json!({
                        "type": "tool_result",
                        "tool_use_id": result.tool_use_id,
                        "content": result.output,
                        "is_error": result.is_error,
                    })
                })
                .collect();
            json!({ "role": "user", "content": blocks })
        }
    }
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
struct MessagesApiRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Deserialize)]
struct MessagesApiResponse {
    #[serde(default)]
    content: Vec<ApiContentBlock>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: HashMap<String, Value>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl From<MessagesApiResponse> for LlmResponse {
    fn from(api: MessagesApiResponse) -> Self {
        let content = api
            .content
            .into_iter()
            .filter_map(|block| match block {
                ApiContentBlock::Text { text } => Some(ContentBlock::Text { text }),
                ApiContentBlock::ToolUse { id, name, input } => {
                    Some(ContentBlock::ToolUse { id, name, input })
                }
                ApiContentBlock::Unsupported => None,
            })
            .collect();

        let stop_reason = api.stop_reason.map(|reason| match reason.as_str() {
            "end_turn" | "stop_sequence" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            _ => StopReason::Other(reason),
        });

        LlmResponse {
            content,
            stop_reason,
            usage: api
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
        }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn send(&self, request: &ModelRequest) -> Result<LlmResponse, GatewayError> {
        let api_key = self
            .endpoint
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::MissingCredential(self.endpoint.api_key_env.clone()))?;

        let body = self.build_body(request);
        debug!(
            "anthropic request: model={} messages={} tools={}",
            body.model,
            body.messages.len(),
            body.tools.len()
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let parsed: MessagesApiResponse = read_json("anthropic", response).await?;
        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{ImageAttachment, ModelId, ToolCall, ToolDefinition, ToolResultMessage};

    fn adapter(key: Option<&str>) -> AnthropicAdapter {
        AnthropicAdapter::new(
            ProviderEndpoint {
                api_key: key.map(str::to_string),
                api_key_env: "ANTHROPIC_API_KEY".to_string(),
                base_url: "https://api.anthropic.com".to_string(),
                max_tokens: 2048,
            },
            "2023-06-01",
        )
        .unwrap()
    }

    #[test]
    fn test_body_shapes() {
        let image = ImageAttachment {
            filename: "a.jpg".to_string(),
            media_type: "image/jpeg".to_string(),
            data: "BBBB".to_string(),
        };
        let call = ToolCall::new("toolu_1", "calculator").with_arg("expression", "1+1");
        let req = ModelRequest::new(
            ModelId::new("claude-sonnet-4-6").unwrap(),
            vec![
                Message::user_with_images("what is this", vec![image]),
                Message::assistant("Let me compute.", vec![call]),
                Message::tool_results(vec![ToolResultMessage {
                    tool_use_id: "toolu_1".to_string(),
                    tool_name: "calculator".to_string(),
                    output: "2".to_string(),
                    is_error: false,
                }]),
            ],
        )
        .with_system_prompt(Some("be exact".to_string()))
        .with_tools(vec![ToolDefinition::new("calculator", "Evaluate")]);

        let body = serde_json::to_value(adapter(Some("k")).build_body(&req)).unwrap();

        assert_eq!(body["system"], "be exact");
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["messages"][0]["content"][0]["source"]["media_type"], "image/jpeg");
        assert_eq!(body["messages"][0]["content"][1]["text"], "what is this");
        assert_eq!(body["messages"][1]["content"][1]["type"], "tool_use");
        assert_eq!(body["messages"][1]["content"][1]["input"]["expression"], "1+1");
        assert_eq!(body["messages"][2]["role"], "user");
        assert_eq!(body["messages"][2]["content"][0]["tool_use_id"], "toolu_1");
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
    }

    #[test]
    fn test_parse_response() {
        let raw = r#"{
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "Checking."},
                {"type": "tool_use", "id": "toolu_9", "name": "web_search", "input": {"query": "tokio"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 30, "output_tokens": 12}
        }"#;
        let parsed: MessagesApiResponse = serde_json::from_str(raw).unwrap();
        let response = LlmResponse::from(parsed);

        assert_eq!(response.content.len(), 2);
        assert_eq!(response.text_content(), "Checking.");
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.usage, Some(TokenUsage::new(30, 12)));
        assert_eq!(response.tool_calls()[0].id, "toolu_9");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let req = ModelRequest::new(ModelId::new("claude-haiku-4-5").unwrap(), vec![Message::user("hi")]);
        let err = adapter(None).send(&req).await.unwrap_err();
        assert_eq!(err.kind(), "missing_credential");
    }
}
