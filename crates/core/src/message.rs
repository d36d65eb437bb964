//! The chat message model.
//!
//! `Content` is serde-untagged so the persisted JSON matches what the
//! browser client stored: a plain string, or an array of typed blocks.

use crate::model::TokenCount;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Message {
    /// The role of the message.
    pub role: Role,

    /// The content of the message.
    pub content: Content,
}

impl Message {
    /// Create a new user message.
    ///
    /// User turns carry the block-sequence form, even for single-text
    /// messages.
    pub fn user(content: impl Into<Content>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new user message from plain text, wrapped in a text block.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentBlock::Text { text: text.into() }])
    }

    /// Create a new assistant message. Assistant turns carry a decoded string.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::Text(content.into()),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Content::Text(content.into()),
        }
    }

    /// Flattened text of this message, text blocks concatenated in order.
    pub fn text(&self) -> String {
        self.content.text_joined("")
    }
}

/// The role of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Role {
    /// The user role.
    #[serde(rename = "user")]
    User,
    /// The assistant role.
    #[serde(rename = "assistant")]
    Assistant,
    /// The system role.
    #[serde(rename = "system")]
    System,
}

/// Message content: a decoded string or an ordered block sequence.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text (assistant and system turns).
    Text(String),
    /// An ordered sequence of content blocks (user turns).
    Blocks(Vec<ContentBlock>),
}

impl Content {
    /// Whether this content carries at least one text-bearing element.
    ///
    /// Pure attachments (image/document/binary blocks with no text block)
    /// are not text-bearing.
    pub fn has_text(&self) -> bool {
        match self {
            Self::Text(_) => true,
            Self::Blocks(blocks) => blocks
                .iter()
                .any(|b| matches!(b, ContentBlock::Text { .. })),
        }
    }

    /// Concatenate all text, joining block texts with `sep`.
    ///
    /// Non-text blocks are skipped; the ordering of text blocks is kept.
    pub fn text_joined(&self, sep: &str) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(sep),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<ContentBlock>> for Content {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        Self::Blocks(blocks)
    }
}

/// A typed content block inside a user turn.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Plain text.
    Text { text: String },
    /// An image attachment.
    Image { source: BlockSource },
    /// A document attachment (PDF).
    Document { source: BlockSource },
    /// An opaque binary attachment.
    Binary { source: BlockSource },
}

/// The payload of an attachment block.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BlockSource {
    /// Encoding of `data`; always `"base64"`.
    #[serde(rename = "type")]
    pub kind: CompactString,
    /// MIME type of the attachment.
    pub media_type: CompactString,
    /// Base64-encoded payload.
    pub data: String,
}

impl BlockSource {
    /// Create a base64 source with the given media type.
    pub fn base64(media_type: impl Into<CompactString>, data: impl Into<String>) -> Self {
        Self {
            kind: CompactString::const_new("base64"),
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

/// Estimate token usage across a slice of messages.
///
/// Uses a fixed ~4-characters-per-token heuristic, summing user-role text
/// into `input_tokens` and assistant-role text into `output_tokens`.
pub fn estimate_tokens(messages: &[Message]) -> TokenCount {
    let mut input_chars = 0usize;
    let mut output_chars = 0usize;

    for message in messages {
        let chars = message.content.text_joined("").len();
        match message.role {
            Role::User => input_chars += chars,
            Role::Assistant => output_chars += chars,
            Role::System => {}
        }
    }

    TokenCount {
        input_tokens: (input_chars / 4) as u32,
        output_tokens: (output_chars / 4) as u32,
    }
}
