//! Configuration file loading for llm-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LLM_COUNCIL_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./llm-council.toml` or `./.llm-council.toml`
//! 4. Global: `$XDG_CONFIG_HOME/llm-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAnthropicConfig, FileConfig, FileCouncilConfig,
    FileExecutionConfig, FileFilesConfig, FileGoogleConfig, FileLoggingConfig, FileOpenAiConfig,
    FilePrice, FileProvidersConfig, FileToolsConfig, ProviderEndpoint,
};
pub use loader::ConfigLoader;
