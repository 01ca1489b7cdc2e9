//! Per-stage results (Value Objects)
//!
//! Everything here is immutable once produced. Model identities appear
//! freely; anonymisation is applied only when evaluator prompts are built.

use super::stage::Stage;
use crate::core::model_id::ModelId;
use crate::council::label::AnonymizedLabel;
use crate::session::response::TokenUsage;
use crate::tool::value_objects::ToolCallRecord;
use serde::{Deserialize, Serialize};

/// Outcome of one successful model call, tool rounds included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    pub usage: Option<TokenUsage>,
    /// Informational: images were attached to the request
    #[serde(default)]
    pub images_consumed: bool,
}

impl ProviderResult {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Content, or the empty string when the model produced none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage1Entry {
    pub model: ModelId,
    pub response: ProviderResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2Entry {
    pub evaluator_model: ModelId,
    pub raw_evaluation: String,
    pub parsed_ranking: Vec<AnonymizedLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub model: ModelId,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionResult {
    pub model: ModelId,
    pub critique: String,
    pub suggested_system_prompt: String,
    pub suggested_query: String,
    pub comparison_to_previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Context carried from one run into its rerun.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousIteration {
    pub query: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    pub stage3_response: String,
    pub critique: String,
}

/// Why a run stopped early, or why stage 4 produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}
