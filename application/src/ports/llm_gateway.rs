//! LLM Gateway port
//!
//! Defines the interface for communicating with model providers. One call
//! is one request/response round; the tool loop lives above the port.

use async_trait::async_trait;
use council_domain::{LlmResponse, ModelRequest};
use thiserror::Error;

/// Typed failure of a gateway round.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Missing credential for {0}")]
    MissingCredential(String),

    #[error("Provider rejected the request: {0}")]
    ProviderRejected(String),
}

impl GatewayError {
    /// Stable failure kind for logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Timeout => "timeout",
            GatewayError::Transport(_) => "transport_error",
            GatewayError::MissingCredential(_) => "missing_credential",
            GatewayError::ProviderRejected(_) => "provider_rejected",
        }
    }
}

/// Gateway for model communication
///
/// Implementations (adapters) live in the infrastructure layer and
/// translate provider wire formats into [`LlmResponse`].
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send one request and return the model's response for this round.
    async fn send(&self, request: &ModelRequest) -> Result<LlmResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(GatewayError::Timeout.kind(), "timeout");
        assert_eq!(GatewayError::Transport("reset".into()).kind(), "transport_error");
        assert_eq!(
            GatewayError::MissingCredential("OPENAI_API_KEY".into()).kind(),
            "missing_credential"
        );
        assert_eq!(
            GatewayError::ProviderRejected("400".into()).to_string(),
            "Provider rejected the request: 400"
        );
    }
}
