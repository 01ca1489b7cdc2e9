//! Model → provider routing

use super::anthropic::AnthropicAdapter;
use super::openai::OpenAiAdapter;
use super::{ProviderAdapter, ProviderKind};
use crate::config::FileProvidersConfig;
use async_trait::async_trait;
use council_application::{GatewayError, LlmGateway};
use council_domain::{LlmResponse, ModelRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The application's [`LlmGateway`]: resolves a provider per model and
/// forwards the round to it.
///
/// Resolution order:
///  1. explicit `[providers.routing]` entry for the model
///  2. family prefix (`claude*`, `gemini*`, `gpt*`/`o<digit>*`)
///  3. configured default provider (OpenAI when unset)
pub struct RoutingGateway {
    providers: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    explicit: HashMap<String, ProviderKind>,
    default_kind: ProviderKind,
}

impl RoutingGateway {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self {
            providers: providers.into_iter().map(|p| (p.kind(), p)).collect(),
            explicit: HashMap::new(),
            default_kind: ProviderKind::OpenAi,
        }
    }

    /// Build every adapter from `[providers]`. Keys are resolved now;
    /// a missing key only fails the calls routed to that provider.
    pub fn from_config(config: &FileProvidersConfig) -> Result<Self, GatewayError> {
        let providers: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(OpenAiAdapter::new(config.openai.endpoint())?),
            Arc::new(AnthropicAdapter::new(
                config.anthropic.endpoint(),
                config.anthropic.api_version.clone(),
            )?),
            Arc::new(OpenAiAdapter::google(config.google.endpoint())?),
        ];

        let mut gateway = Self::new(providers);
        for (model, provider) in &config.routing {
            match provider.parse() {
                Ok(kind) => gateway = gateway.with_route(model.clone(), kind),
                Err(e) => warn!("Ignoring route for {}: {}", model, e),
            }
        }
        if let Some(default) = &config.default {
            match default.parse() {
                Ok(kind) => gateway = gateway.with_default(kind),
                Err(e) => warn!("Ignoring providers.default: {}", e),
            }
        }
        Ok(gateway)
    }

    pub fn with_route(mut self, model: impl Into<String>, kind: ProviderKind) -> Self {
        self.explicit.insert(model.into(), kind);
        self
    }

    pub fn with_default(mut self, kind: ProviderKind) -> Self {
        self.default_kind = kind;
        self
    }

    pub fn resolve_kind(&self, model: &str) -> ProviderKind {
        self.explicit
            .get(model)
            .copied()
            .or_else(|| ProviderKind::infer(model))
            .unwrap_or(self.default_kind)
    }

    fn resolve(&self, model: &str) -> Result<&dyn ProviderAdapter, GatewayError> {
        let kind = self.resolve_kind(model);
        debug!("Routing {} to {}", model, kind);
        self.providers
            .get(&kind)
            .map(|p| p.as_ref())
            .ok_or_else(|| GatewayError::MissingCredential(format!("no {} provider configured", kind)))
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn send(&self, request: &ModelRequest) -> Result<LlmResponse, GatewayError> {
        self.resolve(request.model.as_str())?.send(request).await
    }
}
