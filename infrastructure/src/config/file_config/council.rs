//! Council roster from TOML (`[council]` section)

use council_domain::{Council, DomainError, ModelId};
use serde::{Deserialize, Serialize};

/// # Example
///
/// ```toml
/// [council]
/// models = ["gpt-5.2", "claude-sonnet-4-6", "gemini-2.5-pro"]
/// chairman = "claude-sonnet-4-6"
/// title_model = "gemini-2.5-flash"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Council members, in dispatch order
    pub models: Vec<String>,
    /// Model for synthesis and reflection
    pub chairman: Option<String>,
    /// Model for conversation titles (falls back to the chairman)
    pub title_model: Option<String>,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "gpt-5.2".to_string(),
                "claude-sonnet-4-6".to_string(),
                "gemini-2.5-pro".to_string(),
            ],
            chairman: Some("claude-sonnet-4-6".to_string()),
            title_model: None,
        }
    }
}

impl FileCouncilConfig {
    pub fn to_council(&self) -> Result<Council, DomainError> {
        let chairman = self
            .chairman
            .as_deref()
            .ok_or_else(|| DomainError::InvalidModel("council.chairman is not set".to_string()))?;
        Council::from_strs(&self.models, chairman)
    }

    pub fn to_title_model(&self) -> Option<ModelId> {
        self.title_model
            .as_deref()
            .and_then(|m| ModelId::new(m).ok())
    }
}
