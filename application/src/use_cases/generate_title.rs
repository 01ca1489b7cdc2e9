//! Generate Title use case.
//!
//! Asks a cheap model for a short conversation title. Never fails: any
//! error, timeout or empty answer yields [`DEFAULT_TITLE`].

use crate::ports::llm_gateway::LlmGateway;
use council_domain::{Message, ModelId, ModelRequest, PromptTemplate};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TITLE: &str = "New Conversation";

/// Longest title kept, in characters
const MAX_TITLE_CHARS: usize = 50;

pub struct GenerateTitleUseCase {
    gateway: Arc<dyn LlmGateway>,
    model: ModelId,
    timeout: Duration,
}

impl GenerateTitleUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: ModelId, timeout: Duration) -> Self {
        Self {
            gateway,
            model,
            timeout,
        }
    }

    pub async fn execute(&self, query: &str) -> String {
        let request = ModelRequest::new(
            self.model.clone(),
            vec![Message::user(PromptTemplate::title_prompt(query))],
        );

        match tokio::time::timeout(self.timeout, self.gateway.send(&request)).await {
            Ok(Ok(response)) => {
                let title = clean_title(&response.text_content());
                debug!("Generated title: {:?}", title);
                title
            }
            Ok(Err(e)) => {
                warn!("Title generation failed ({}): {}", e.kind(), e);
                DEFAULT_TITLE.to_string()
            }
            Err(_) => {
                warn!("Title generation timed out after {:?}", self.timeout);
                DEFAULT_TITLE.to_string()
            }
        }
    }
}

fn clean_title(raw: &str) -> String {
    let first_line = raw.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let title = first_line
        .trim()
        .trim_start_matches("Title:")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim();

    if title.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        let clipped: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        return format!("{}...", clipped.trim_end());
    }
    title.to_string()
}
