//! Core domain concepts shared across all subdomains.
//!
//! - [`model_id::ModelId`]: opaque identifier of a backend model
//! - [`question::Question`]: a validated query to pose to the council
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model_id;
pub mod question;
pub mod string;
