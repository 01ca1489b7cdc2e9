//! Council configuration container.
//!
//! [`CouncilConfig`] groups the static settings a front end resolves once
//! (council, execution bounds, pricing, default tools) and builds
//! [`RunCouncilInput`]s from them.

use crate::config::ExecutionParams;
use crate::use_cases::run_council::RunCouncilInput;
use council_domain::{Council, ModelId, PricingTable};

#[derive(Debug, Clone)]
pub struct CouncilConfig {
    council: Council,
    execution: ExecutionParams,
    pricing: PricingTable,
    default_tools: Vec<String>,
    title_model: Option<ModelId>,
}

impl CouncilConfig {
    pub fn new(council: Council) -> Self {
        Self {
            council,
            execution: ExecutionParams::default(),
            pricing: PricingTable::builtin(),
            default_tools: Vec::new(),
            title_model: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_execution(mut self, execution: ExecutionParams) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_default_tools(mut self, tools: Vec<String>) -> Self {
        self.default_tools = tools;
        self
    }

    pub fn with_title_model(mut self, model: Option<ModelId>) -> Self {
        self.title_model = model;
        self
    }

    // ==================== Accessors ====================

    pub fn council(&self) -> &Council {
        &self.council
    }

    pub fn execution(&self) -> &ExecutionParams {
        &self.execution
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    pub fn default_tools(&self) -> &[String] {
        &self.default_tools
    }

    /// Model used for titles; falls back to the chairman.
    pub fn title_model(&self) -> &ModelId {
        self.title_model
            .as_ref()
            .unwrap_or_else(|| self.council.chairman())
    }

    // ==================== Factory Methods ====================

    /// Input for one run of `query` with this configuration's defaults.
    pub fn to_run_input(&self, query: impl Into<String>) -> RunCouncilInput {
        RunCouncilInput::new(self.council.clone(), query).with_tools(self.default_tools.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_run_input_carries_defaults() {
        let council = Council::from_strs(&["a", "b"], "c").unwrap();
        let config = CouncilConfig::new(council).with_default_tools(vec!["calculator".to_string()]);
        let input = config.to_run_input("Why?");
        assert_eq!(input.query, "Why?");
        assert_eq!(input.enabled_tools, vec!["calculator".to_string()]);
        assert_eq!(input.council.len(), 2);
    }

    #[test]
    fn test_title_model_falls_back_to_chairman() {
        let council = Council::from_strs(&["a"], "chair").unwrap();
        let config = CouncilConfig::new(council);
        assert_eq!(config.title_model().as_str(), "chair");
    }
}
