//! Application layer for llm-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilConfig, ExecutionParams};
pub use ports::{
    connector::{ConnectorError, ConnectorPort, NoConnectors},
    conversation_logger::{
        ConversationEvent, ConversationLogger, MemoryConversationLogger, NoConversationLogger,
    },
    file_context::{FileContext, FileContextError, FileContextPort},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoProgress, ProgressNotifier},
    tool_executor::{NoTools, ToolExecutorPort},
};
pub use use_cases::generate_title::{DEFAULT_TITLE, GenerateTitleUseCase};
pub use use_cases::optimize_prompt::{OptimizePromptUseCase, OptimizedPrompt};
pub use use_cases::prepare_context::PrepareContextUseCase;
pub use use_cases::query_model::{ModelCall, QueryModelUseCase};
pub use use_cases::run_council::{
    EventEmitter, RunCouncilError, RunCouncilInput, RunCouncilUseCase,
};
