//! A single multi-turn conversation.

use kcore::{Message, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name a conversation carries until its first title is derived.
pub const DEFAULT_CHAT_NAME: &str = "NEW CHAT";

/// A conversation: identity, title, system prompt, and the ordered turns.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Conversation {
    /// Globally unique, immutable after creation.
    pub id: String,
    /// Display title; auto-derived once, user-editable afterwards.
    pub chat_name: String,
    /// System prompt sent with every completion request.
    pub system: String,
    /// Turns in chronological order.
    pub context: Vec<Message>,
}

impl Conversation {
    pub(crate) fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            chat_name: DEFAULT_CHAT_NAME.to_owned(),
            system: String::new(),
            context: Vec::new(),
        }
    }

    /// Whether the title still carries the default placeholder.
    pub fn has_default_name(&self) -> bool {
        self.chat_name == DEFAULT_CHAT_NAME
    }

    /// Flattened text of the first user turn that carries any, if one
    /// exists.
    pub(crate) fn first_user_text(&self) -> Option<String> {
        self.context
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.text_joined(""))
            .find(|text| !text.is_empty())
    }

    /// Flattened text of the first assistant turn, if non-empty.
    pub(crate) fn first_assistant_text(&self) -> Option<String> {
        self.context
            .iter()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.text_joined(""))
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcore::{BlockSource, ContentBlock};

    #[test]
    fn fresh_conversations_have_distinct_ids() {
        let a = Conversation::new();
        let b = Conversation::new();
        assert_ne!(a.id, b.id);
        assert!(a.has_default_name());
        assert!(a.context.is_empty());
        assert_eq!(a.system, "");
    }

    #[test]
    fn first_user_text_skips_pure_attachments() {
        let mut conv = Conversation::new();
        conv.context.push(Message::user(vec![ContentBlock::Image {
            source: BlockSource::base64("image/png", "aGk="),
        }]));
        conv.context.push(Message::user_text("actual question"));
        assert_eq!(conv.first_user_text().as_deref(), Some("actual question"));
    }

    #[test]
    fn first_assistant_text_requires_an_assistant_turn() {
        let mut conv = Conversation::new();
        conv.context.push(Message::user_text("hi"));
        assert!(conv.first_assistant_text().is_none());

        conv.context.push(Message::assistant("hello"));
        assert_eq!(conv.first_assistant_text().as_deref(), Some("hello"));
    }
}
