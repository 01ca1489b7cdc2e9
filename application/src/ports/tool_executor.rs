//! Tool Executor port
//!
//! Defines the interface for executing tools requested by models.

use async_trait::async_trait;
use council_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::ToolResult,
};

/// Port for tool execution
///
/// The registry is read-only and shared by every concurrent model call.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get(name).is_some()
    }

    /// Definitions for the enabled tool names that this executor knows
    fn definitions_for(&self, enabled: &[String]) -> Vec<ToolDefinition> {
        self.tool_spec().select(enabled)
    }

    /// Execute a tool call. Unknown tools and tool errors come back as
    /// failed results, never as a panic or an `Err`.
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}

/// Executor with no tools, for runs without tool support.
#[derive(Debug, Default)]
pub struct NoTools {
    spec: ToolSpec,
}

#[async_trait]
impl ToolExecutorPort for NoTools {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        ToolResult::failure(
            &call.tool_name,
            council_domain::ToolError::unknown_tool(&call.tool_name),
        )
    }
}
