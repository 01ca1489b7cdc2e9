//! Shared utilities for use cases.
//!
//! Cancellation checks and short previews used across the council stages.

use crate::use_cases::run_council::RunCouncilError;
use tokio_util::sync::CancellationToken;

use council_domain::tool::entities::ToolCall;

/// Check if cancellation has been requested.
///
/// Returns `Err(RunCouncilError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunCouncilError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunCouncilError::Cancelled);
    }
    Ok(())
}

/// Extract a short preview string from tool call arguments.
///
/// Looks for well-known keys (`expression`, `query`, `url`, `code`)
/// first, then falls back to the first string value found.
pub(crate) fn tool_args_preview(call: &ToolCall) -> String {
    let keys = ["expression", "query", "url", "code"];
    for key in &keys {
        if let Some(serde_json::Value::String(s)) = call.arguments.get(*key) {
            return truncate_preview(s, 50);
        }
    }
    for value in call.arguments.values() {
        if let Some(s) = value.as_str() {
            return truncate_preview(s, 50);
        }
    }
    String::new()
}

fn truncate_preview(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_cancelled() {
        assert!(check_cancelled(&None).is_ok());
        let token = CancellationToken::new();
        assert!(check_cancelled(&Some(token.clone())).is_ok());
        token.cancel();
        assert!(matches!(
            check_cancelled(&Some(token)),
            Err(RunCouncilError::Cancelled)
        ));
    }

    #[test]
    fn test_known_key_preferred() {
        let call = ToolCall::new("1", "web_search")
            .with_arg("max_results", "5")
            .with_arg("query", "tokio joinset");
        assert_eq!(tool_args_preview(&call), "tokio joinset");
    }

    #[test]
    fn test_long_preview_truncated() {
        let call = ToolCall::new("1", "code_execution").with_arg("code", "x".repeat(80));
        let preview = tool_args_preview(&call);
        assert_eq!(preview.chars().count(), 50);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn test_no_string_args() {
        let call = ToolCall::new("1", "calculator").with_arg("n", 3);
        assert_eq!(tool_args_preview(&call), "");
    }
}
