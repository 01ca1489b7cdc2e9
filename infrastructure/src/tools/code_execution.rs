//! `code_execution` tool: run a Python snippet in a `python3 -c` subprocess.
//!
//! Opt-in only (`[tools] code_execution = true`). The child is killed when
//! the timeout elapses.

use super::web::truncate_chars;
use council_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult},
};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub const CODE_EXECUTION: &str = "code_execution";

/// Default time limit for one snippet
pub const DEFAULT_CODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Character limit for combined stdout/stderr
const MAX_OUTPUT_CHARS: usize = 5_000;

const PYTHON: &str = "python3";

pub fn code_execution_definition() -> ToolDefinition {
    ToolDefinition::new(
        CODE_EXECUTION,
        "Execute Python code and return the output. Code runs in an isolated subprocess with a 10-second timeout.",
    )
    .with_parameter(ToolParameter::new("code", "The Python code to execute", true))
    .with_parameter(ToolParameter::new(
        "language",
        "Programming language (currently only 'python' is supported)",
        false,
    ))
}

pub async fn execute_code(call: &ToolCall, timeout: Duration) -> ToolResult {
    let code = match call.require_string("code") {
        Ok(c) => c,
        Err(e) => return ToolResult::failure(CODE_EXECUTION, ToolError::invalid_argument(e)),
    };

    let language = call.get_string("language").unwrap_or("python");
    if language != "python" {
        return ToolResult::failure(
            CODE_EXECUTION,
            ToolError::invalid_argument(format!(
                "Only Python execution is supported. Got: {}",
                language
            )),
        );
    }

    let child = Command::new(PYTHON)
        .arg("-c")
        .arg(code)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult::failure(
                CODE_EXECUTION,
                ToolError::execution_failed(format!("Code execution failed: {}", e)),
            );
        }
        Err(_) => {
            return ToolResult::failure(
                CODE_EXECUTION,
                ToolError::execution_failed(format!(
                    "Code execution timed out ({}s limit)",
                    timeout.as_secs()
                )),
            );
        }
    };

    debug!(status = ?output.status, "Code execution finished");
    ToolResult::success(
        CODE_EXECUTION,
        render_output(&output.stdout, &output.stderr),
    )
}

/// stdout, then stderr under a `STDERR:` marker, truncated.
fn render_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        text.push_str("\nSTDERR:\n");
        text.push_str(&String::from_utf8_lossy(stderr));
    }
    if text.trim().is_empty() {
        return "(no output)".to_string();
    }
    truncate_chars(&text, MAX_OUTPUT_CHARS)
}
