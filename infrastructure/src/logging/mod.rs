//! Structured conversation logging.
//!
//! [`JsonlConversationLogger`] implements the
//! [`ConversationLogger`](council_application::ConversationLogger) port.
//! Operational diagnostics go through `tracing` instead.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
