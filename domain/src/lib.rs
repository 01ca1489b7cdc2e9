//! Domain layer for llm-council
//!
//! This crate contains the deliberation types, the ranking and reflection
//! parsers, pricing and the pipeline state machine. It has no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is an ordered set of models that answer a query
//! independently, then rank each other's answers under anonymous labels.
//! A designated chairman synthesises one answer and reflects on it.
//!
//! ## Pipeline
//!
//! One run moves `idle → stage1 → stage2 → stage3 → stage4 → complete`
//! (or `failed`), emitting a [`PipelineEvent`] at every boundary.

pub mod connector;
pub mod core;
pub mod cost;
pub mod council;
pub mod pipeline;
pub mod prompt;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use connector::{ConnectorInfo, ConnectorRequest};
pub use core::{error::DomainError, model_id::ModelId, question::Question};
pub use cost::{
    breakdown::{CostBreakdown, Nanodollars, UsageLine},
    pricing::{ModelPrice, PricingTable},
};
pub use council::{
    label::{AnonymizedLabel, LabelMap},
    ranking::{AggregateRankingRow, aggregate_rankings, parse_ranking},
    reflection::{ReflectionSections, parse_reflection},
    roster::Council,
};
pub use pipeline::{
    entries::{
        PreviousIteration, ProviderResult, ReflectionResult, Stage1Entry, Stage2Entry,
        StageFailure, SynthesisResult,
    },
    event::{PipelineEvent, RankingMetadata},
    run::PipelineRun,
    stage::Stage,
    state::PipelineState,
};
pub use prompt::PromptTemplate;
pub use session::{
    message::{ImageAttachment, Message, ToolResultMessage},
    request::ModelRequest,
    response::{ContentBlock, LlmResponse, StopReason, TokenUsage},
};
pub use tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    value_objects::{ToolCallRecord, ToolError, ToolResult},
};
