//! Port for structured conversation logging.
//!
//! Records the transcript of a run (council answers, peer evaluations,
//! synthesis, reflection, tool calls, cost) as machine-readable records.
//! Operational diagnostics go through `tracing` instead.

use serde_json::Value;
use std::sync::Mutex;

/// A structured conversation record.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    /// Record type (e.g. "council_response", "peer_evaluation", "tool_call")
    pub event_type: &'static str,
    /// Record-specific fields
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for conversation records.
///
/// `log` is synchronous and infallible: a logging failure must never
/// disturb a run.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Logging disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

/// Keeps records in memory; handy for tests and for callers that
/// persist the transcript themselves.
#[derive(Default)]
pub struct MemoryConversationLogger {
    events: Mutex<Vec<ConversationEvent>>,
}

impl MemoryConversationLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ConversationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, event_type: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl ConversationLogger for MemoryConversationLogger {
    fn log(&self, event: ConversationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
