//! HTTP plumbing shared by the adapters

use council_application::GatewayError;
use council_domain::core::string::truncate;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Characters of an error body kept in `ProviderRejected`
const ERROR_BODY_EXCERPT: usize = 500;

/// Maximum accepted response body (4MB)
const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

pub(super) fn client() -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .gzip(true)
        .build()
        .map_err(|e| GatewayError::Transport(format!("Failed to create HTTP client: {}", e)))
}

pub(super) fn map_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(e.to_string())
    }
}

/// Read the body, reject non-2xx, then decode.
pub(super) async fn read_json<T: DeserializeOwned>(
    provider: &str,
    mut response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(map_reqwest_error)? {
        if bytes.len() + chunk.len() > MAX_RESPONSE_BYTES {
            return Err(GatewayError::Transport(format!(
                "{} response exceeds {} bytes",
                provider, MAX_RESPONSE_BYTES
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    let body = String::from_utf8_lossy(&bytes);

    if !status.is_success() {
        return Err(GatewayError::ProviderRejected(format!(
            "{} HTTP {}: {}",
            provider,
            status.as_u16(),
            truncate(body.trim(), ERROR_BODY_EXCERPT)
        )));
    }

    debug!("{} response: {} bytes", provider, bytes.len());
    serde_json::from_str(&body)
        .map_err(|e| GatewayError::Transport(format!("{} returned invalid JSON: {}", provider, e)))
}

/// Parse tool-call arguments; models occasionally emit malformed JSON.
pub(super) fn parse_arguments(
    raw: &str,
) -> std::collections::HashMap<String, serde_json::Value> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => {
            debug!("Unparseable tool arguments: {}", raw);
            std::collections::HashMap::new()
        }
    }
}
