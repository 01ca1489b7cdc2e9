//! Built-in connectors, run once before Stage 1
//!
//! | Name | Config | Output |
//! |------|--------|--------|
//! | `web_search` | `query`, `max_results` (5) | `Title/Snippet/URL` lines per hit |
//! | `url_content` | `url` | page text, truncated to 15,000 chars |
//! | `rest_api` | `url`, `method` (GET), `headers`, `body` | `Status: <code>` then the body, truncated |
//!
//! The use case wraps each output in a `[<NAME> DATA]` block; this adapter
//! only fetches.

use crate::tools::web;
use async_trait::async_trait;
use council_application::ports::connector::{ConnectorError, ConnectorPort};
use council_domain::{ConnectorInfo, ConnectorRequest};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const WEB_SEARCH: &str = "web_search";
pub const URL_CONTENT: &str = "url_content";
pub const REST_API: &str = "rest_api";

/// Character limit for connector output
pub const CONNECTOR_MAX_CHARS: usize = 15_000;

const DEFAULT_MAX_RESULTS: usize = 5;
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Connectors backed by plain HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpConnectors {
    client: reqwest::Client,
}

impl HttpConnectors {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn web_search(&self, request: &ConnectorRequest) -> Result<String, ConnectorError> {
        let query = required(request, "query")?;
        let max_results = request
            .config
            .get("max_results")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let hits = web::search(&self.client, query, max_results)
            .await
            .map_err(|message| failed(request, message))?;
        if hits.is_empty() {
            return Ok("No search results found.".to_string());
        }
        Ok(hits
            .iter()
            .map(|hit| {
                format!(
                    "Title: {}\nSnippet: {}\nURL: {}\n",
                    hit.title, hit.snippet, hit.url
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn url_content(&self, request: &ConnectorRequest) -> Result<String, ConnectorError> {
        let url = required(request, "url")?;
        web::fetch_text(&self.client, url, CONNECTOR_MAX_CHARS)
            .await
            .map_err(|message| failed(request, message))
    }

    async fn rest_api(&self, request: &ConnectorRequest) -> Result<String, ConnectorError> {
        let url = required(request, "url")
            .or_else(|_| required(request, "endpoint"))?;
        let method = request.config_str("method").unwrap_or("GET").to_ascii_uppercase();
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| ConnectorError::InvalidConfig {
            connector: request.name.clone(),
            message: format!("invalid HTTP method '{}'", method),
        })?;
        let headers = header_map(request)?;

        let mut builder = self.client.request(method, url).headers(headers);
        builder = match request.config.get("body") {
            None | Some(Value::Null) => builder,
            Some(Value::String(text)) => builder.body(text.clone()),
            Some(json) => builder.json(json),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| failed(request, e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| failed(request, e.to_string()))?;
        debug!(url, status, bytes = text.len(), "REST connector response");

        Ok(format!(
            "Status: {}\n\n{}",
            status,
            web::truncate_chars(&text, CONNECTOR_MAX_CHARS)
        ))
    }
}

impl Default for HttpConnectors {
    fn default() -> Self {
        Self::new()
    }
}

fn required<'a>(request: &'a ConnectorRequest, key: &str) -> Result<&'a str, ConnectorError> {
    request
        .config_str(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConnectorError::InvalidConfig {
            connector: request.name.clone(),
            message: format!("missing '{}'", key),
        })
}

fn failed(request: &ConnectorRequest, message: String) -> ConnectorError {
    ConnectorError::Failed {
        connector: request.name.clone(),
        message,
    }
}

fn header_map(request: &ConnectorRequest) -> Result<HeaderMap, ConnectorError> {
    let invalid = |message: String| ConnectorError::InvalidConfig {
        connector: request.name.clone(),
        message,
    };

    let mut headers = HeaderMap::new();
    let Some(raw) = request.config.get("headers") else {
        return Ok(headers);
    };
    let Some(object) = raw.as_object() else {
        return Err(invalid("'headers' must be an object".to_string()));
    };
    for (name, value) in object {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| invalid(format!("invalid header name '{}'", name)))?;
        let value = value
            .as_str()
            .and_then(|v| HeaderValue::from_str(v).ok())
            .ok_or_else(|| invalid(format!("invalid value for header '{}'", name)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[async_trait]
impl ConnectorPort for HttpConnectors {
    fn available(&self) -> Vec<ConnectorInfo> {
        [
            (
                WEB_SEARCH,
                "Search the web before the query and inject the results as context.",
            ),
            (
                URL_CONTENT,
                "Fetch a web page and inject its text as context.",
            ),
            (
                REST_API,
                "Call a REST endpoint and inject the response as context.",
            ),
        ]
        .into_iter()
        .map(|(name, description)| ConnectorInfo {
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
    }

    async fn run(&self, request: &ConnectorRequest) -> Result<String, ConnectorError> {
        debug!(connector = %request.name, "Running connector");
        match request.name.as_str() {
            WEB_SEARCH => self.web_search(request).await,
            URL_CONTENT => self.url_content(request).await,
            REST_API => self.rest_api(request).await,
            other => Err(ConnectorError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_available_connectors() {
        let names: Vec<String> = HttpConnectors::new()
            .available()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["web_search", "url_content", "rest_api"]);
    }

    #[tokio::test]
    async fn test_unknown_connector() {
        let result = HttpConnectors::new()
            .run(&ConnectorRequest::new("slack", json!({})))
            .await;
        assert_eq!(result, Err(ConnectorError::Unknown("slack".to_string())));
    }

    #[tokio::test]
    async fn test_missing_required_config() {
        let connectors = HttpConnectors::new();
        for name in [WEB_SEARCH, URL_CONTENT, REST_API] {
            let result = connectors.run(&ConnectorRequest::new(name, json!({}))).await;
            assert!(
                matches!(result, Err(ConnectorError::InvalidConfig { .. })),
                "{} should reject empty config",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_rest_api_rejects_bad_method() {
        let request = ConnectorRequest::new(
            REST_API,
            json!({"url": "http://localhost/x", "method": "GE T"}),
        );
        let result = HttpConnectors::new().run(&request).await;
        assert!(matches!(result, Err(ConnectorError::InvalidConfig { .. })));
    }

    #[test]
    fn test_header_map() {
        let request = ConnectorRequest::new(
            REST_API,
            json!({"url": "http://x", "headers": {"Accept": "application/json"}}),
        );
        let headers = header_map(&request).unwrap();
        assert_eq!(headers.get("accept").unwrap(), "application/json");

        let bad = ConnectorRequest::new(REST_API, json!({"headers": {"X-Num": 3}}));
        assert!(header_map(&bad).is_err());
    }
}
