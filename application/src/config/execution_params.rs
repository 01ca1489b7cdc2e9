//! Execution parameters: use case loop control.
//!
//! [`ExecutionParams`] groups the static parameters that bound every model
//! call made by the council pipeline. These are application-layer
//! concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds on model calls and event delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum request/response rounds per call when tools are in play.
    pub max_tool_rounds: usize,
    /// Upper bound on one call, all tool rounds included.
    pub call_timeout: Duration,
    /// Upper bound on each individual round.
    pub round_timeout: Option<Duration>,
    /// Upper bound on title generation.
    pub title_timeout: Duration,
    /// Capacity of the event channel.
    pub event_buffer: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_tool_rounds: 5,
            call_timeout: Duration::from_secs(120),
            round_timeout: None,
            title_timeout: Duration::from_secs(30),
            event_buffer: 64,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max.max(1);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_round_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.round_timeout = timeout;
        self
    }

    pub fn with_title_timeout(mut self, timeout: Duration) -> Self {
        self.title_timeout = timeout;
        self
    }

    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_tool_rounds, 5);
        assert_eq!(params.call_timeout, Duration::from_secs(120));
        assert_eq!(params.round_timeout, None);
        assert_eq!(params.title_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builders_clamp_to_one() {
        let params = ExecutionParams::default()
            .with_max_tool_rounds(0)
            .with_event_buffer(0)
            .with_round_timeout(Some(Duration::from_secs(30)));
        assert_eq!(params.max_tool_rounds, 1);
        assert_eq!(params.event_buffer, 1);
        assert_eq!(params.round_timeout, Some(Duration::from_secs(30)));
    }
}
