//! Execution bounds from TOML (`[execution]` section)

use council_application::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Tool-use rounds per model call
    pub max_tool_rounds: usize,
    /// Bound on one whole model call, tool rounds included
    pub call_timeout_secs: u64,
    /// Bound on a single provider round
    pub round_timeout_secs: Option<u64>,
    pub title_timeout_secs: u64,
    /// Capacity of the event channel
    pub event_buffer: usize,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            max_tool_rounds: params.max_tool_rounds,
            call_timeout_secs: params.call_timeout.as_secs(),
            round_timeout_secs: params.round_timeout.map(|d| d.as_secs()),
            title_timeout_secs: params.title_timeout.as_secs(),
            event_buffer: params.event_buffer,
        }
    }
}

impl FileExecutionConfig {
    pub fn to_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_tool_rounds(self.max_tool_rounds)
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs))
            .with_round_timeout(self.round_timeout_secs.map(Duration::from_secs))
            .with_title_timeout(Duration::from_secs(self.title_timeout_secs))
            .with_event_buffer(self.event_buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_params() {
        let config = FileExecutionConfig {
            max_tool_rounds: 3,
            call_timeout_secs: 60,
            round_timeout_secs: Some(20),
            title_timeout_secs: 5,
            event_buffer: 16,
        };
        let params = config.to_params();
        assert_eq!(params.max_tool_rounds, 3);
        assert_eq!(params.call_timeout, Duration::from_secs(60));
        assert_eq!(params.round_timeout, Some(Duration::from_secs(20)));
        assert_eq!(params.event_buffer, 16);
    }
}
