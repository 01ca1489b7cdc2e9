//! Input and error types for the council pipeline

use council_domain::{Council, DomainError, ImageAttachment, PreviousIteration};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Conditions outside the stage failure taxonomy. Stage failures are
/// reported on the returned run and as `error` events instead.
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Pipeline invariant violated: {0}")]
    Domain(#[from] DomainError),
}

impl RunCouncilError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunCouncilError::Cancelled)
    }
}

/// Input for one run (first query or rerun)
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    pub council: Council,
    pub query: String,
    /// Applied to Stage 1 calls only
    pub system_prompt: Option<String>,
    /// Text extracted from attached files and connectors
    pub file_context: Option<String>,
    pub images: Vec<ImageAttachment>,
    /// Tool names offered to council members in Stage 1
    pub enabled_tools: Vec<String>,
    pub previous_iteration: Option<PreviousIteration>,
    /// Whether Stage 1 (and the reflection) see the previous iteration
    pub share_previous_context: bool,
    pub cancellation: Option<CancellationToken>,
}

impl RunCouncilInput {
    pub fn new(council: Council, query: impl Into<String>) -> Self {
        Self {
            council,
            query: query.into(),
            system_prompt: None,
            file_context: None,
            images: Vec::new(),
            enabled_tools: Vec::new(),
            previous_iteration: None,
            share_previous_context: false,
            cancellation: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_file_context(mut self, text: Option<String>, images: Vec<ImageAttachment>) -> Self {
        self.file_context = text.filter(|t| !t.trim().is_empty());
        self.images = images;
        self
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.enabled_tools = tools;
        self
    }

    /// Seed a rerun. `share` controls whether Stage 1 prompts include it.
    pub fn with_previous_iteration(mut self, previous: Option<PreviousIteration>, share: bool) -> Self {
        self.previous_iteration = previous;
        self.share_previous_context = share;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The previous iteration, when it is to be shared with models.
    pub fn shared_previous(&self) -> Option<&PreviousIteration> {
        self.previous_iteration
            .as_ref()
            .filter(|_| self.share_previous_context)
    }
}
