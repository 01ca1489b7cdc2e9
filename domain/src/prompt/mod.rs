//! Prompt domain
//!
//! Templates for every stage of a council run, plus the context wrappers
//! applied to the Stage 1 query.

mod template;

pub use template::PromptTemplate;
