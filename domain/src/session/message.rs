//! Conversation messages

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// An image handed to models alongside the text prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub filename: String,
    /// MIME type, e.g. `image/png`
    pub media_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl ImageAttachment {
    /// `data:` URI form used by OpenAI-style APIs
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Output of one tool call, paired with the request by `tool_use_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMessage {
    pub tool_use_id: String,
    pub tool_name: String,
    pub output: String,
    pub is_error: bool,
}

/// A message in a model conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        images: Vec<ImageAttachment>,
    },
    Assistant {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    ToolResults {
        results: Vec<ToolResultMessage>,
    },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message::User {
            text: text.into(),
            images: Vec::new(),
        }
    }

    pub fn user_with_images(text: impl Into<String>, images: Vec<ImageAttachment>) -> Self {
        Message::User {
            text: text.into(),
            images,
        }
    }

    pub fn assistant(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            text: text.into(),
            tool_calls,
        }
    }

    pub fn tool_results(results: Vec<ToolResultMessage>) -> Self {
        Message::ToolResults { results }
    }

    /// Whether this message carries any image
    pub fn has_images(&self) -> bool {
        matches!(self, Message::User { images, .. } if !images.is_empty())
    }
}
