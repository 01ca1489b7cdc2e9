//! `calculator` tool: evaluate an arithmetic expression with `evalexpr`.
//!
//! Python-style `**` is accepted as exponentiation, and the common math
//! functions (`abs`, `sqrt`, `pow`, `ln`, `exp`, trigonometry) may be
//! written without evalexpr's `math::` namespace. `min`, `max`, `round`,
//! `floor` and `ceil` are evalexpr builtins already.

use council_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult},
};
use evalexpr::{ContextWithMutableVariables, HashMapContext, Value};
use regex::Regex;
use std::sync::LazyLock;

pub const CALCULATOR: &str = "calculator";

static MATH_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(abs|sqrt|pow|ln|exp|sin|cos|tan|asin|acos|atan|atan2|sinh|cosh|tanh)\s*\(")
        .expect("static regex must compile")
});

static BARE_PI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpi\b").expect("static regex must compile"));

pub fn calculator_definition() -> ToolDefinition {
    ToolDefinition::new(
        CALCULATOR,
        "Evaluate a mathematical expression. Supports basic arithmetic (+, -, *, /, **, %), abs(), round(), min(), max(), pow().",
    )
    .with_parameter(ToolParameter::new(
        "expression",
        "The math expression to evaluate (e.g., '2**10', '(3.14 * 5**2)')",
        true,
    ))
}

pub fn execute_calculator(call: &ToolCall) -> ToolResult {
    let expression = match call.require_string("expression") {
        Ok(e) => e,
        Err(e) => return ToolResult::failure(CALCULATOR, ToolError::invalid_argument(e)),
    };

    match evaluate(expression) {
        Ok(value) => ToolResult::success(CALCULATOR, value),
        Err(e) => ToolResult::failure(
            CALCULATOR,
            ToolError::execution_failed(format!("Calculation error: {}", e)),
        ),
    }
}

/// Evaluate `expression` and render the value.
pub fn evaluate(expression: &str) -> Result<String, String> {
    let prepared = prepare(expression);

    let mut context: HashMapContext = HashMapContext::new();
    context
        .set_value("math::PI".to_string(), Value::Float(std::f64::consts::PI))
        .map_err(|e| e.to_string())?;
    context
        .set_value("math::E".to_string(), Value::Float(std::f64::consts::E))
        .map_err(|e| e.to_string())?;

    let value = evalexpr::eval_with_context(&prepared, &context).map_err(|e| e.to_string())?;
    match value {
        Value::Int(_) | Value::Float(_) | Value::Boolean(_) => Ok(value.to_string()),
        other => Err(format!("result is not a number: {}", other)),
    }
}

fn prepare(expression: &str) -> String {
    let expr = expression.trim().replace("**", "^");
    let expr = MATH_FN.replace_all(&expr, "math::$1(");
    BARE_PI.replace_all(&expr, "math::PI").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), "14");
        assert_eq!(evaluate("(10 - 4) / 2").unwrap(), "3");
        assert_eq!(evaluate("7 % 3").unwrap(), "1");
    }

    #[test]
    fn test_python_power_and_functions() {
        assert_eq!(evaluate("2**10").unwrap(), "1024");
        assert_eq!(evaluate("sqrt(16.0)").unwrap(), "4");
        assert_eq!(evaluate("max(3, 9, 4)").unwrap(), "9");
        assert_eq!(prepare("abs (x) + pi"), "math::abs(x) + math::PI");
    }

    #[test]
    fn test_invalid_expression_is_error_result() {
        let call = ToolCall::new("c1", CALCULATOR).with_arg("expression", "2 +");
        let result = execute_calculator(&call);
        assert!(!result.is_success());
        assert!(result.content().starts_with("Error: Calculation error"));
    }

    #[test]
    fn test_tool_call_success() {
        let call = ToolCall::new("c1", CALCULATOR).with_arg("expression", "1.5 * 2");
        let result = execute_calculator(&call);
        assert_eq!(result.content(), "3");
    }
}
