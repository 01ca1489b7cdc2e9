//! File context port
//!
//! Supplies text and images extracted from files attached to a conversation.

use async_trait::async_trait;
use council_domain::ImageAttachment;
use thiserror::Error;

/// Text and images attached to one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContext {
    pub text: String,
    pub images: Vec<ImageAttachment>,
}

impl FileContext {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.images.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum FileContextError {
    #[error("Invalid conversation id: {0}")]
    InvalidConversation(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait FileContextPort: Send + Sync {
    async fn get_file_context(&self, conversation_id: &str) -> Result<FileContext, FileContextError>;
}
