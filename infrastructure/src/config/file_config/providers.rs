//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolved credentials and endpoint for one HTTP provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub api_key: Option<String>,
    /// Env var the key was expected in, for error messages
    pub api_key_env: String,
    pub base_url: String,
    pub max_tokens: u32,
}

/// Explicit key first, then the environment. Blank keys count as missing.
fn resolve_api_key(api_key: Option<&String>, api_key_env: &str) -> Option<String> {
    api_key
        .cloned()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(api_key_env).ok())
        .filter(|k| !k.trim().is_empty())
}

/// Anthropic Messages API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended; use the env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
    /// Default max tokens per response.
    pub max_tokens: u32,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            api_version: "2023-06-01".to_string(),
        }
    }
}

impl FileAnthropicConfig {
    pub fn endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint {
            api_key: resolve_api_key(self.api_key.as_ref(), &self.api_key_env),
            api_key_env: self.api_key_env.clone(),
            base_url: self.base_url.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

/// OpenAI Chat Completions settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    /// Base URL (can point at any OpenAI-compatible server).
    pub base_url: String,
    pub max_tokens: u32,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            max_tokens: 8192,
        }
    }
}

impl FileOpenAiConfig {
    pub fn endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint {
            api_key: resolve_api_key(self.api_key.as_ref(), &self.api_key_env),
            api_key_env: self.api_key_env.clone(),
            base_url: self.base_url.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

/// Gemini through its OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGoogleConfig {
    /// Environment variable name for the API key (default: "GOOGLE_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_tokens: u32,
}

impl Default for FileGoogleConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GOOGLE_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            max_tokens: 8192,
        }
    }
}

impl FileGoogleConfig {
    pub fn endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint {
            api_key: resolve_api_key(self.api_key.as_ref(), &self.api_key_env),
            api_key_env: self.api_key_env.clone(),
            base_url: self.base_url.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Provider for models no prefix rule matches: "openai", "anthropic", "google".
    pub default: Option<String>,
    pub openai: FileOpenAiConfig,
    pub anthropic: FileAnthropicConfig,
    pub google: FileGoogleConfig,
    /// Explicit model → provider routing overrides.
    pub routing: HashMap<String, String>,
}
