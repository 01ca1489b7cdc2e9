//! Connector port
//!
//! Connectors fetch external context (search results, page content, API
//! payloads) before Stage 1. Failures are independent per connector.

use async_trait::async_trait;
use council_domain::{ConnectorInfo, ConnectorRequest};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("Unknown connector: {0}")]
    Unknown(String),

    #[error("Invalid configuration for {connector}: {message}")]
    InvalidConfig { connector: String, message: String },

    #[error("Connector {connector} failed: {message}")]
    Failed { connector: String, message: String },
}

#[async_trait]
pub trait ConnectorPort: Send + Sync {
    /// Connectors this adapter can run
    fn available(&self) -> Vec<ConnectorInfo>;

    /// Run one connector and return its context text.
    async fn run(&self, request: &ConnectorRequest) -> Result<String, ConnectorError>;
}

/// Port implementation with no connectors.
pub struct NoConnectors;

#[async_trait]
impl ConnectorPort for NoConnectors {
    fn available(&self) -> Vec<ConnectorInfo> {
        Vec::new()
    }

    async fn run(&self, request: &ConnectorRequest) -> Result<String, ConnectorError> {
        Err(ConnectorError::Unknown(request.name.clone()))
    }
}
