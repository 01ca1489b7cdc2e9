//! Presentation layer for llm-council
//!
//! This crate contains the CLI definition, output formatters and
//! progress reporters that render the pipeline's event stream.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::events::describe_event;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
