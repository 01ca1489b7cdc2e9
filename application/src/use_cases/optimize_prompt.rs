//! Optimize Prompt use case.
//!
//! Has the chairman rewrite a system prompt and query before a run.
//! Sections the model leaves out keep their original value, and any
//! failure returns the input unchanged.

use crate::ports::llm_gateway::LlmGateway;
use council_domain::council::reflection::{
    SUGGESTED_QUERY_HEADER, SUGGESTED_SYSTEM_PROMPT_HEADER, split_sections,
};
use council_domain::{Message, ModelId, ModelRequest, PromptTemplate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizedPrompt {
    pub system_prompt: Option<String>,
    pub query: String,
    /// False when the input came back unchanged because the call failed
    #[serde(skip)]
    pub optimized: bool,
}

pub struct OptimizePromptUseCase {
    gateway: Arc<dyn LlmGateway>,
    model: ModelId,
}

impl OptimizePromptUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: ModelId) -> Self {
        Self { gateway, model }
    }

    pub async fn execute(&self, system_prompt: Option<&str>, query: &str) -> OptimizedPrompt {
        let unchanged = || OptimizedPrompt {
            system_prompt: system_prompt.map(str::to_string),
            query: query.to_string(),
            optimized: false,
        };

        let request = ModelRequest::new(
            self.model.clone(),
            vec![Message::user(PromptTemplate::optimize_prompt(system_prompt, query))],
        )
        .with_system_prompt(Some(PromptTemplate::optimize_system().to_string()));

        let response = match self.gateway.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Prompt optimisation failed ({}): {}", e.kind(), e);
                return unchanged();
            }
        };

        let text = response.text_content();
        let mut sections =
            split_sections(&text, &[SUGGESTED_SYSTEM_PROMPT_HEADER, SUGGESTED_QUERY_HEADER]);
        let new_system = sections
            .remove(SUGGESTED_SYSTEM_PROMPT_HEADER)
            .filter(|s| !s.is_empty());
        let new_query = sections
            .remove(SUGGESTED_QUERY_HEADER)
            .filter(|s| !s.is_empty());

        if new_system.is_none() && new_query.is_none() {
            warn!("Prompt optimisation returned no usable sections");
            return unchanged();
        }

        info!("Optimised prompt with {}", self.model);
        OptimizedPrompt {
            system_prompt: new_system.or_else(|| system_prompt.map(str::to_string)),
            query: new_query.unwrap_or_else(|| query.to_string()),
            optimized: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;
    use council_domain::LlmResponse;

    struct Fixed(Result<&'static str, GatewayError>);

    #[async_trait]
    impl LlmGateway for Fixed {
        async fn send(&self, request: &ModelRequest) -> Result<LlmResponse, GatewayError> {
            assert!(request.system_prompt.is_some());
            self.0.clone().map(LlmResponse::from_text)
        }
    }

    fn use_case(reply: Result<&'static str, GatewayError>) -> OptimizePromptUseCase {
        OptimizePromptUseCase::new(Arc::new(Fixed(reply)), ModelId::new("chair").unwrap())
    }

    #[tokio::test]
    async fn test_both_sections() {
        let result = use_case(Ok(
            "SUGGESTED_SYSTEM_PROMPT:\nYou are an expert.\n\nSUGGESTED_QUERY:\nExplain X in depth.",
        ))
        .execute(None, "explain x")
        .await;

        assert!(result.optimized);
        assert_eq!(result.system_prompt.as_deref(), Some("You are an expert."));
        assert_eq!(result.query, "Explain X in depth.");
    }

    #[tokio::test]
    async fn test_missing_section_keeps_original() {
        let result = use_case(Ok("SUGGESTED_QUERY:\nBetter query"))
            .execute(Some("Be brief."), "q")
            .await;

        assert_eq!(result.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(result.query, "Better query");
    }

    #[tokio::test]
    async fn test_failure_returns_input() {
        let result = use_case(Err(GatewayError::Timeout))
            .execute(Some("Be brief."), "q")
            .await;

        assert!(!result.optimized);
        assert_eq!(result.query, "q");
    }

    #[tokio::test]
    async fn test_unstructured_answer_returns_input() {
        let result = use_case(Ok("I think it is fine.")).execute(None, "q").await;
        assert!(!result.optimized);
        assert_eq!(result.system_prompt, None);
    }
}
