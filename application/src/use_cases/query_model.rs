//! Query Model use case.
//!
//! One logical call to one model: a bounded tool-use loop on top of the
//! single-round [`LlmGateway`] port, producing a [`ProviderResult`].
//!
//! ```text
//! AwaitingModel ──(no tool calls / tools withheld)──▶ Done
//!      │  ▲
//!      ▼  │
//! AwaitingTools
//! ```
//!
//! At most `max_tool_rounds` batches of tools run. After the last batch
//! the model is asked once more with no tools offered, so it has to
//! answer in text. The whole loop runs under `call_timeout`; each round
//! additionally under `round_timeout` when set.

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::shared::tool_args_preview;
use council_domain::core::string::clip_chars;
use council_domain::{
    LlmResponse, Message, ModelId, ModelRequest, ProviderResult, TokenUsage, ToolCall,
    ToolCallRecord, ToolDefinition, ToolResultMessage,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Characters of a tool result kept in the conversation log
const LOGGED_TOOL_RESULT_CHARS: usize = 2000;

/// What to send for one logical model call.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub model: ModelId,
    pub system_prompt: Option<String>,
    pub message: Message,
    pub tools: Vec<ToolDefinition>,
}

impl ModelCall {
    pub fn new(model: ModelId, message: Message) -> Self {
        Self {
            model,
            system_prompt: None,
            message,
            tools: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

enum LoopState {
    AwaitingModel { tool_rounds: usize, offer_tools: bool },
    AwaitingTools { tool_rounds: usize, calls: Vec<ToolCall> },
    Done,
}

pub struct QueryModelUseCase {
    gateway: Arc<dyn LlmGateway>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    conversation_logger: Arc<dyn ConversationLogger>,
    params: ExecutionParams,
}

impl Clone for QueryModelUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tool_executor: self.tool_executor.clone(),
            conversation_logger: self.conversation_logger.clone(),
            params: self.params.clone(),
        }
    }
}

impl QueryModelUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        conversation_logger: Arc<dyn ConversationLogger>,
        params: ExecutionParams,
    ) -> Self {
        Self {
            gateway,
            tool_executor,
            conversation_logger,
            params,
        }
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    /// Run one call to completion, bounded by `call_timeout`.
    pub async fn execute(&self, call: ModelCall) -> Result<ProviderResult, GatewayError> {
        let model = call.model.clone();
        match tokio::time::timeout(self.params.call_timeout, self.run_loop(call)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Call to {} exceeded {:?}", model, self.params.call_timeout);
                Err(GatewayError::Timeout)
            }
        }
    }

    async fn run_loop(&self, call: ModelCall) -> Result<ProviderResult, GatewayError> {
        let images_consumed = call.message.has_images();
        let max_rounds = self.params.max_tool_rounds.max(1);
        let tools_offered = !call.tools.is_empty();

        let mut messages = vec![call.message];
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut usage: Option<TokenUsage> = None;
        let mut content: Option<String> = None;
        let mut state = LoopState::AwaitingModel {
            tool_rounds: 0,
            offer_tools: tools_offered,
        };

        loop {
            state = match state {
                LoopState::AwaitingModel { tool_rounds, offer_tools } => {
                    let tools = if offer_tools { call.tools.clone() } else { Vec::new() };
                    let request = ModelRequest::new(call.model.clone(), messages.clone())
                        .with_system_prompt(call.system_prompt.clone())
                        .with_tools(tools);
                    let response = self.send_round(&request).await?;

                    if let Some(round_usage) = response.usage {
                        usage = Some(usage.unwrap_or_default() + round_usage);
                    }
                    let text = response.text_content();
                    if !text.trim().is_empty() {
                        content = Some(text.clone());
                    }

                    let calls = response.tool_calls();
                    if calls.is_empty() || !offer_tools {
                        LoopState::Done
                    } else {
                        messages.push(Message::assistant(text, calls.clone()));
                        LoopState::AwaitingTools { tool_rounds, calls }
                    }
                }
                LoopState::AwaitingTools { tool_rounds, calls } => {
                    let results = self.run_tools(&call.model, &calls).await;
                    for (tool_call, message) in calls.iter().zip(&results) {
                        records.push(ToolCallRecord {
                            tool_name: tool_call.tool_name.clone(),
                            args: tool_call.arguments_json(),
                            result: message.output.clone(),
                            is_error: message.is_error,
                        });
                    }
                    messages.push(Message::tool_results(results));

                    let tool_rounds = tool_rounds + 1;
                    let offer_tools = tool_rounds < max_rounds;
                    if !offer_tools {
                        warn!(
                            "{} used {} tool rounds; asking for a final answer without tools",
                            call.model, max_rounds
                        );
                    }
                    LoopState::AwaitingModel { tool_rounds, offer_tools }
                }
                LoopState::Done => break,
            };
        }

        Ok(ProviderResult {
            content,
            tool_calls: records,
            usage,
            images_consumed,
        })
    }

    async fn send_round(&self, request: &ModelRequest) -> Result<LlmResponse, GatewayError> {
        match self.params.round_timeout {
            Some(limit) => tokio::time::timeout(limit, self.gateway.send(request))
                .await
                .map_err(|_| GatewayError::Timeout)?,
            None => self.gateway.send(request).await,
        }
    }

    /// Execute every requested tool concurrently, preserving request order.
    async fn run_tools(&self, model: &ModelId, calls: &[ToolCall]) -> Vec<ToolResultMessage> {
        let futures = calls.iter().map(|call| {
            debug!("{} → {}({})", model, call.tool_name, tool_args_preview(call));
            self.tool_executor.execute(call)
        });
        let results = futures::future::join_all(futures).await;

        calls
            .iter()
            .zip(results)
            .map(|(call, result)| {
                let output = result.content();
                let is_error = !result.is_success();
                self.conversation_logger.log(ConversationEvent::new(
                    "tool_call",
                    serde_json::json!({
                        "model": model.as_str(),
                        "tool": call.tool_name,
                        "args": call.arguments_json(),
                        "result": clip_chars(&output, LOGGED_TOOL_RESULT_CHARS),
                        "is_error": is_error,
                    }),
                ));
                ToolResultMessage {
                    tool_use_id: call.id.clone(),
                    tool_name: call.tool_name.clone(),
                    output,
                    is_error,
                }
            })
            .collect()
    }
}
