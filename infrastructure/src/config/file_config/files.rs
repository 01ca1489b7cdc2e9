//! File context and conversation log locations (`[files]`, `[logging]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFilesConfig {
    /// Directory holding one sub-directory of attachments per conversation
    pub root: PathBuf,
}

impl Default for FileFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/files"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of every run (disabled when unset)
    pub conversation_log: Option<PathBuf>,
}
