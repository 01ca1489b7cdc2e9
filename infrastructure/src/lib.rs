//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: provider HTTP clients behind a routing
//! gateway, tools, connectors, attachments, the JSONL transcript and
//! configuration file loading.

pub mod config;
pub mod connectors;
pub mod files;
pub mod logging;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileCouncilConfig, FileExecutionConfig,
    FileProvidersConfig, FileToolsConfig,
};
pub use connectors::HttpConnectors;
pub use files::LocalFileContextLoader;
pub use logging::JsonlConversationLogger;
pub use providers::{ProviderKind, routing::RoutingGateway};
pub use tools::{LocalToolExecutor, default_tool_spec};
