//! Prepare Context use case.
//!
//! Gathers what Stage 1 sees besides the query: connector output first,
//! then the text and images attached to the conversation. Every source
//! is optional and a failing source is skipped.

use crate::ports::connector::ConnectorPort;
use crate::ports::file_context::{FileContext, FileContextPort};
use council_domain::{ConnectorRequest, PromptTemplate};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PrepareContextUseCase {
    connectors: Arc<dyn ConnectorPort>,
    files: Option<Arc<dyn FileContextPort>>,
}

impl PrepareContextUseCase {
    pub fn new(connectors: Arc<dyn ConnectorPort>) -> Self {
        Self {
            connectors,
            files: None,
        }
    }

    pub fn with_files(mut self, files: Arc<dyn FileContextPort>) -> Self {
        self.files = Some(files);
        self
    }

    pub async fn execute(
        &self,
        conversation_id: Option<&str>,
        requests: &[ConnectorRequest],
    ) -> FileContext {
        let mut blocks = self.run_connectors(requests).await;

        let mut images = Vec::new();
        if let (Some(files), Some(id)) = (&self.files, conversation_id) {
            match files.get_file_context(id).await {
                Ok(context) => {
                    info!(
                        "Loaded file context for {} ({} chars, {} images)",
                        id,
                        context.text.len(),
                        context.images.len()
                    );
                    if !context.text.trim().is_empty() {
                        blocks.push(context.text);
                    }
                    images = context.images;
                }
                Err(e) => warn!("Skipping file context for {}: {}", id, e),
            }
        }

        FileContext {
            text: blocks.join("\n\n"),
            images,
        }
    }

    /// Run connectors concurrently; output keeps request order.
    async fn run_connectors(&self, requests: &[ConnectorRequest]) -> Vec<String> {
        let results = join_all(requests.iter().map(|r| self.connectors.run(r))).await;

        requests
            .iter()
            .zip(results)
            .filter_map(|(request, result)| match result {
                Ok(text) if !text.trim().is_empty() => {
                    info!("Connector {} returned {} chars", request.name, text.len());
                    Some(PromptTemplate::connector_block(&request.name, &text))
                }
                Ok(_) => {
                    warn!("Connector {} returned nothing", request.name);
                    None
                }
                Err(e) => {
                    warn!("Connector {} failed: {}", request.name, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::connector::ConnectorError;
    use crate::ports::file_context::FileContextError;
    use async_trait::async_trait;
    use council_domain::{ConnectorInfo, ImageAttachment};

    struct FakeConnectors;

    #[async_trait]
    impl ConnectorPort for FakeConnectors {
        fn available(&self) -> Vec<ConnectorInfo> {
            Vec::new()
        }

        async fn run(&self, request: &ConnectorRequest) -> Result<String, ConnectorError> {
            match request.name.as_str() {
                "web_search" => Ok("result one".to_string()),
                "rest_api" => Err(ConnectorError::Failed {
                    connector: "rest_api".to_string(),
                    message: "HTTP 500".to_string(),
                }),
                other => Err(ConnectorError::Unknown(other.to_string())),
            }
        }
    }

    struct FakeFiles;

    #[async_trait]
    impl FileContextPort for FakeFiles {
        async fn get_file_context(&self, id: &str) -> Result<FileContext, FileContextError> {
            if id == "missing" {
                return Err(FileContextError::InvalidConversation(id.to_string()));
            }
            Ok(FileContext {
                text: "--- notes.md ---\nhello".to_string(),
                images: vec![ImageAttachment {
                    filename: "chart.png".to_string(),
                    media_type: "image/png".to_string(),
                    data: "aGk=".to_string(),
                }],
            })
        }
    }

    #[tokio::test]
    async fn test_connectors_precede_files() {
        let uc = PrepareContextUseCase::new(Arc::new(FakeConnectors)).with_files(Arc::new(FakeFiles));
        let requests = vec![
            ConnectorRequest::new("web_search", serde_json::json!({"query": "rust"})),
            ConnectorRequest::new("rest_api", serde_json::json!({})),
        ];

        let context = uc.execute(Some("c1"), &requests).await;

        assert_eq!(
            context.text,
            "[WEB_SEARCH DATA]\nresult one\n[END WEB_SEARCH DATA]\n\n--- notes.md ---\nhello"
        );
        assert_eq!(context.images.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_sources_are_skipped() {
        let uc = PrepareContextUseCase::new(Arc::new(FakeConnectors)).with_files(Arc::new(FakeFiles));
        let requests = vec![ConnectorRequest::new("rest_api", serde_json::json!({}))];

        let context = uc.execute(Some("missing"), &requests).await;

        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_no_conversation_no_files() {
        let uc = PrepareContextUseCase::new(Arc::new(FakeConnectors)).with_files(Arc::new(FakeFiles));
        let context = uc.execute(None, &[]).await;
        assert!(context.is_empty());
    }
}
