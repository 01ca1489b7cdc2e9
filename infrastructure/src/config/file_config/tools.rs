//! Tools configuration from TOML (`[tools]` section)
//!
//! ```toml
//! [tools]
//! enabled = ["calculator", "web_search"]
//! code_execution = false     # opt-in: runs model-written Python
//! code_timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Tools offered to council members when no `--tool` flag is given
    pub enabled: Vec<String>,
    /// Register the `code_execution` tool
    pub code_execution: bool,
    pub code_timeout_secs: u64,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            enabled: Vec::new(),
            code_execution: false,
            code_timeout_secs: 10,
        }
    }
}
