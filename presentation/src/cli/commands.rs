//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// All four stages, aggregate ranking and cost
    Full,
    /// Only the chairman's synthesis
    Synthesis,
    /// The whole run as JSON
    Json,
    /// The event stream, one JSON object per line
    Events,
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "LLM Council - models answer, rank each other anonymously, and a chairman synthesises")]
#[command(long_about = r#"
llm-council asks a council of language models one question.

A run has four stages:
1. Collect:    every council member answers independently (in parallel)
2. Rank:       each member ranks the anonymised answers (Response A, B, ...)
3. Synthesise: the chairman writes one answer from all of the above
4. Reflect:    the chairman critiques its answer and suggests a better prompt

Configuration files are loaded from (in priority order):
1. LLM_COUNCIL_* environment variables
2. --config <path>     Explicit config file
3. ./llm-council.toml  Project-level config
4. ~/.config/llm-council/config.toml   Global config

Example:
  llm-council "What's the best way to handle errors in Rust?"
  llm-council -m gpt-5.2 -m claude-sonnet-4-6 --chairman claude-opus-4-6 "Compare async runtimes"
  llm-council --iterations 2 --share-context "Draft a migration plan"
"#)]
pub struct Cli {
    /// The question to ask the council
    pub question: Option<String>,

    /// Council members (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model that synthesises and reflects
    #[arg(long, value_name = "MODEL")]
    pub chairman: Option<String>,

    /// System prompt for the Stage 1 answers
    #[arg(short, long, value_name = "TEXT")]
    pub system_prompt: Option<String>,

    /// Tools offered to council members (can be specified multiple times)
    #[arg(long = "tool", value_name = "NAME")]
    pub tools: Vec<String>,

    /// Connector to run before Stage 1, as NAME or NAME:{json config}
    #[arg(long = "connector", value_name = "NAME[:JSON]")]
    pub connectors: Vec<String>,

    /// Conversation whose attached files are given to the council
    #[arg(long, value_name = "ID")]
    pub conversation: Option<String>,

    /// Previous iteration (JSON) to rerun from
    #[arg(long, value_name = "PATH")]
    pub previous: Option<PathBuf>,

    /// Share the previous iteration with the council and the reflection
    #[arg(long)]
    pub share_context: bool,

    /// Number of runs; each rerun uses the reflection's suggestions
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub iterations: u32,

    /// Write the last run's iteration bundle (JSON) to this path
    #[arg(long, value_name = "PATH")]
    pub save_iteration: Option<PathBuf>,

    /// Let the chairman rewrite the prompt before the first run
    #[arg(long)]
    pub optimize: bool,

    /// Generate a short title for the question
    #[arg(long)]
    pub title: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List tools and connectors and exit
    #[arg(long)]
    pub list_tools: bool,

    /// Show the pricing table and exit
    #[arg(long)]
    pub pricing: bool,

    /// Also write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// True when the invocation only prints information and exits.
    pub fn is_info_command(&self) -> bool {
        self.show_config || self.list_tools || self.pricing
    }
}
