//! JSON Schema for tool parameters.
//!
//! Provider-neutral; each adapter wraps the schema in its own envelope
//! (`input_schema` for Anthropic, `function.parameters` for OpenAI).
//!
//! param_type → JSON Schema type:
//! - `"number"`, `"integer"`, `"boolean"` map to themselves
//! - anything else → `"string"`

use council_domain::ToolDefinition;
use serde_json::{Map, Value, json};

pub fn parameters_schema(tool: &ToolDefinition) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &tool.parameters {
        let schema_type = match param.param_type.as_str() {
            "number" => "number",
            "integer" => "integer",
            "boolean" => "boolean",
            _ => "string",
        };
        properties.insert(
            param.name.clone(),
            json!({ "type": schema_type, "description": param.description }),
        );
        if param.required {
            required.push(json!(param.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::ToolParameter;

    #[test]
    fn test_parameters_schema() {
        let tool = ToolDefinition::new("web_search", "Search the web")
            .with_parameter(ToolParameter::new("query", "Search query", true))
            .with_parameter(
                ToolParameter::new("max_results", "Result count", false).with_type("integer"),
            );

        let schema = parameters_schema(&tool);

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["properties"]["query"]["description"], "Search query");
        assert_eq!(schema["properties"]["max_results"]["type"], "integer");
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required, &vec![json!("query")]);
    }

    #[test]
    fn test_unknown_type_is_string() {
        let tool = ToolDefinition::new("t", "d")
            .with_parameter(ToolParameter::new("p", "d", false).with_type("path"));
        assert_eq!(parameters_schema(&tool)["properties"]["p"]["type"], "string");
    }
}
