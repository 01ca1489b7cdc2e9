//! LLM provider adapters.
//!
//! Each adapter translates [`ModelRequest`]/[`LlmResponse`] to one HTTP
//! API. [`routing::RoutingGateway`] picks the adapter per model and is
//! what the application sees as its [`LlmGateway`](council_application::LlmGateway).

pub mod anthropic;
mod http;
pub mod openai;
pub mod routing;

use async_trait::async_trait;
use council_application::GatewayError;
use council_domain::{LlmResponse, ModelRequest};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Google,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
        }
    }

    /// Provider implied by a model id's family prefix.
    pub fn infer(model: &str) -> Option<Self> {
        let model = model.to_ascii_lowercase();
        if model.starts_with("claude") {
            Some(ProviderKind::Anthropic)
        } else if model.starts_with("gemini") {
            Some(ProviderKind::Google)
        } else if model.starts_with("gpt")
            || model.starts_with("chatgpt")
            || (model.starts_with('o') && model[1..].starts_with(|c: char| c.is_ascii_digit()))
        {
            Some(ProviderKind::OpenAi)
        } else {
            None
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "google" | "gemini" => Ok(ProviderKind::Google),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// One provider's API, one round per call.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;
    async fn send(&self, request: &ModelRequest) -> Result<LlmResponse, GatewayError>;
}
