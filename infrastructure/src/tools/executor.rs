//! Local tool executor, the concrete implementation of [`ToolExecutorPort`].
//!
//! [`LocalToolExecutor`] owns one shared `reqwest::Client` for the web
//! tools and dispatches each call by tool name:
//!
//! ```text
//! ToolExecutorPort::execute()
//!   ├─ calculator      → evalexpr (synchronous)
//!   ├─ web_search      → DuckDuckGo HTML + scraper
//!   ├─ url_fetch       → reqwest + scraper
//!   ├─ code_execution  → python3 -c (only when enabled)
//!   └─ anything else   → failure "Unknown tool '<name>'"
//! ```

use super::{calculator, code_execution, web};
use async_trait::async_trait;
use council_application::ports::tool_executor::ToolExecutorPort;
use council_domain::tool::{
    entities::{ToolCall, ToolSpec},
    value_objects::{ToolError, ToolResult},
};
use std::time::Duration;
use tracing::debug;

/// Timeout for web tool requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Executor for the built-in council tools.
///
/// The registry is fixed at construction; `code_execution` is only
/// registered when explicitly enabled.
#[derive(Debug, Clone)]
pub struct LocalToolExecutor {
    tool_spec: ToolSpec,
    http_client: reqwest::Client,
    code_timeout: Duration,
}

impl LocalToolExecutor {
    /// Executor with the default tool set (no code execution).
    pub fn new() -> Self {
        Self::with_tools(super::default_tool_spec(false))
    }

    pub fn with_tools(tool_spec: ToolSpec) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            tool_spec,
            http_client,
            code_timeout: code_execution::DEFAULT_CODE_TIMEOUT,
        }
    }

    /// Register `code_execution` with the given timeout.
    pub fn with_code_execution(mut self, timeout: Duration) -> Self {
        self.tool_spec = self
            .tool_spec
            .register(code_execution::code_execution_definition());
        self.code_timeout = timeout;
        self
    }
}

impl Default for LocalToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for LocalToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        if self.tool_spec.get(&call.tool_name).is_none() {
            return ToolResult::failure(&call.tool_name, ToolError::unknown_tool(&call.tool_name));
        }

        debug!(tool = %call.tool_name, id = %call.id, "Executing tool");
        match call.tool_name.as_str() {
            calculator::CALCULATOR => calculator::execute_calculator(call),
            web::WEB_SEARCH => web::execute_web_search(&self.http_client, call).await,
            web::URL_FETCH => web::execute_url_fetch(&self.http_client, call).await,
            code_execution::CODE_EXECUTION => {
                code_execution::execute_code(call, self.code_timeout).await
            }
            _ => ToolResult::failure(&call.tool_name, ToolError::unknown_tool(&call.tool_name)),
        }
    }
}
