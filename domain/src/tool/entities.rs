//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Definition of a tool a model may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (e.g., "calculator", "web_search")
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// Parameters the tool accepts
    pub parameters: Vec<ToolParameter>,
}

/// A parameter for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// JSON-schema type name ("string", "number", "integer", "boolean")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// Registry of tools known to an executor, keyed by name.
///
/// Read-only once built; safe to share across concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    /// Definitions for the enabled names that are known, in the order given.
    /// Unknown names are skipped.
    pub fn select<S: AsRef<str>>(&self, enabled: &[S]) -> Vec<ToolDefinition> {
        enabled
            .iter()
            .filter_map(|name| self.tools.get(name.as_ref()).cloned())
            .collect()
    }
}

/// A tool invocation requested by a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id used to pair the result with the request
    pub id: String,
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// Arguments as a JSON object, for logs and tool-call records
    pub fn arguments_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ToolSpec {
        ToolSpec::new()
            .register(ToolDefinition::new("calculator", "Evaluate arithmetic"))
            .register(
                ToolDefinition::new("web_search", "Search the web").with_parameter(
                    ToolParameter::new("query", "Search terms", true),
                ),
            )
    }

    #[test]
    fn test_select_keeps_requested_order_and_skips_unknown() {
        let selected = spec().select(&["web_search", "teleport", "calculator"]);
        let names: Vec<&str> = selected.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["web_search", "calculator"]);
    }

    #[test]
    fn test_parameter_defaults_to_string() {
        let tool = spec().get("web_search").cloned().unwrap();
        assert_eq!(tool.parameters[0].param_type, "string");
        assert!(tool.parameters[0].required);
    }

    #[test]
    fn test_tool_call_arguments() {
        let call = ToolCall::new("call_1", "web_search")
            .with_arg("query", "rust async")
            .with_arg("max_results", 3);
        assert_eq!(call.get_string("query"), Some("rust async"));
        assert_eq!(call.get_i64("max_results"), Some(3));
        assert!(call.require_string("missing").is_err());
        assert_eq!(call.arguments_json()["query"], "rust async");
    }
}
