//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod generate_title;
pub mod optimize_prompt;
pub mod prepare_context;
pub mod query_model;
pub mod run_council;
pub(crate) mod shared;
