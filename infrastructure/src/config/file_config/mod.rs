//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types on demand.

mod council;
mod execution;
mod files;
mod pricing;
mod providers;
mod tools;

pub use council::FileCouncilConfig;
pub use execution::FileExecutionConfig;
pub use files::{FileFilesConfig, FileLoggingConfig};
pub use pricing::FilePrice;
pub use providers::{
    FileAnthropicConfig, FileGoogleConfig, FileOpenAiConfig, FileProvidersConfig,
    ProviderEndpoint,
};
pub use tools::FileToolsConfig;

use crate::providers::ProviderKind;
use council_application::CouncilConfig;
use council_domain::PricingTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A problem found by [`FileConfig::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("council.models is empty")]
    EmptyCouncil,

    #[error("council.chairman is not set")]
    MissingChairman,

    #[error("{field}: {message}")]
    InvalidModel { field: String, message: String },

    #[error("{field}: unknown provider '{value}' (expected openai, anthropic or google)")]
    UnknownProvider { field: String, value: String },

    #[error("execution.max_tool_rounds must be at least 1")]
    ZeroToolRounds,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub council: FileCouncilConfig,
    pub execution: FileExecutionConfig,
    /// Per-model price overrides, USD per 1M tokens
    pub pricing: BTreeMap<String, FilePrice>,
    pub providers: FileProvidersConfig,
    pub tools: FileToolsConfig,
    pub files: FileFilesConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.council.models.is_empty() {
            issues.push(ConfigValidationError::EmptyCouncil);
        }
        if self.council.chairman.is_none() {
            issues.push(ConfigValidationError::MissingChairman);
        }
        if !self.council.models.is_empty()
            && self.council.chairman.is_some()
            && let Err(e) = self.council.to_council()
        {
            issues.push(ConfigValidationError::InvalidModel {
                field: "council".to_string(),
                message: e.to_string(),
            });
        }

        if let Some(default) = &self.providers.default
            && default.parse::<ProviderKind>().is_err()
        {
            issues.push(ConfigValidationError::UnknownProvider {
                field: "providers.default".to_string(),
                value: default.clone(),
            });
        }
        let mut routes: Vec<_> = self.providers.routing.iter().collect();
        routes.sort();
        for (model, provider) in routes {
            if provider.parse::<ProviderKind>().is_err() {
                issues.push(ConfigValidationError::UnknownProvider {
                    field: format!("providers.routing.{}", model),
                    value: provider.clone(),
                });
            }
        }

        if self.execution.max_tool_rounds == 0 {
            issues.push(ConfigValidationError::ZeroToolRounds);
        }

        issues
    }

    pub fn pricing_table(&self) -> PricingTable {
        pricing::pricing_table(&self.pricing)
    }

    /// Application config for the council described by this file.
    pub fn to_council_config(&self) -> Result<CouncilConfig, ConfigValidationError> {
        if self.council.models.is_empty() {
            return Err(ConfigValidationError::EmptyCouncil);
        }
        let council = self
            .council
            .to_council()
            .map_err(|e| ConfigValidationError::InvalidModel {
                field: "council".to_string(),
                message: e.to_string(),
            })?;
        Ok(CouncilConfig::new(council)
            .with_execution(self.execution.to_params())
            .with_pricing(self.pricing_table())
            .with_default_tools(self.tools.enabled.clone())
            .with_title_model(self.council.to_title_model()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[council]
models = ["gpt-4.1", "claude-haiku-4-5-20251001"]
chairman = "gpt-4.1"

[execution]
max_tool_rounds = 3
call_timeout_secs = 90

[pricing]
"gpt-4.1" = { input = 1.0, output = 4.0 }

[providers]
default = "openai"

[tools]
enabled = ["calculator"]

[files]
root = "/var/lib/council/files"

[logging]
conversation_log = "council.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.council.models.len(), 2);
        assert_eq!(config.execution.max_tool_rounds, 3);
        assert_eq!(config.execution.title_timeout_secs, 30);
        assert_eq!(config.tools.enabled, vec!["calculator".to_string()]);
        assert_eq!(config.files.root.to_string_lossy(), "/var/lib/council/files");
        assert!(config.logging.conversation_log.is_some());
        assert!(config.validate().is_empty());

        let council_config = config.to_council_config().unwrap();
        assert_eq!(council_config.council().chairman().as_str(), "gpt-4.1");
        assert_eq!(council_config.execution().max_tool_rounds, 3);
        assert_eq!(council_config.default_tools(), ["calculator".to_string()]);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert!(config.to_council_config().is_ok());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let toml_str = r#"
[council]
models = []
chairman = "x"

[providers]
default = "copilot"
routing = { "m" = "bedrock" }

[execution]
max_tool_rounds = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(
            issues,
            vec![
                ConfigValidationError::EmptyCouncil,
                ConfigValidationError::UnknownProvider {
                    field: "providers.default".to_string(),
                    value: "copilot".to_string(),
                },
                ConfigValidationError::UnknownProvider {
                    field: "providers.routing.m".to_string(),
                    value: "bedrock".to_string(),
                },
                ConfigValidationError::ZeroToolRounds,
            ]
        );
    }

    #[test]
    fn test_duplicate_member_reported() {
        let toml_str = r#"
[council]
models = ["a", "a"]
chairman = "c"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate().as_slice(),
            [ConfigValidationError::InvalidModel { .. }]
        ));
    }
}
