//! Connectors: named data sources run once before Stage 1 whose output
//! is prepended to the file context.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A connector to run, with its free-form configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorRequest {
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl ConnectorRequest {
    pub fn new(name: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(|v| v.as_str())
    }
}

/// Parses `name` or `name:{json}`.
impl FromStr for ConnectorRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, config) = match s.split_once(':') {
            Some((name, raw)) => {
                let config = serde_json::from_str(raw)
                    .map_err(|e| format!("invalid connector config for '{}': {}", name, e))?;
                (name, config)
            }
            None => (s, serde_json::Value::Object(Default::default())),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err("connector name cannot be empty".to_string());
        }
        Ok(ConnectorRequest::new(name, config))
    }
}

/// Description of an available connector, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorInfo {
    pub name: String,
    pub description: String,
}
