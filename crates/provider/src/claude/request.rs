//! Request body for the Anthropic Messages API.

use kcore::{Content, ContentBlock, Message, Role};
use serde::Serialize;
use serde_json::{Value, json};

/// Claude completions default; the original client never raised it.
const MAX_TOKENS: usize = 1024;

/// The request body for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Request {
    /// The model identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: usize,
    /// System prompt (top-level, not in the messages array).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The messages array (Anthropic content block format).
    pub messages: Vec<Value>,
    /// Whether to stream the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl Request {
    /// Build a request for `model`, converting messages to the Anthropic
    /// content-block format and folding role-`system` turns plus an explicit
    /// `system` string into the dedicated channel.
    pub fn new(model: &str, messages: &[Message], system: &str) -> Self {
        let (folded, wire) = to_anthropic(messages);

        let mut parts = Vec::new();
        if !system.is_empty() {
            parts.push(system.to_owned());
        }
        parts.extend(folded);

        Self {
            model: model.to_owned(),
            max_tokens: MAX_TOKENS,
            system: if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n"))
            },
            messages: wire,
            stream: None,
        }
    }

    /// Enable streaming for the request.
    pub fn stream(mut self) -> Self {
        self.stream = Some(true);
        self
    }
}

/// Convert messages to Anthropic wire form.
///
/// Returns the text of any role-`system` turns (they live in the top-level
/// `system` field, not the array) and the user/assistant messages. User
/// block sequences pass through 1:1 — the persisted block format is already
/// the Anthropic one — except `binary` blocks, which the API has no type
/// for and which are dropped.
pub(crate) fn to_anthropic(messages: &[Message]) -> (Vec<String>, Vec<Value>) {
    let mut system = Vec::new();
    let mut wire = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => {
                let text = msg.content.text_joined("\n");
                if !text.is_empty() {
                    system.push(text);
                }
            }
            Role::User => {
                wire.push(json!({
                    "role": "user",
                    "content": user_content(&msg.content),
                }));
            }
            Role::Assistant => {
                wire.push(json!({
                    "role": "assistant",
                    "content": msg.content.text_joined("\n"),
                }));
            }
        }
    }

    (system, wire)
}

fn user_content(content: &Content) -> Value {
    match content {
        Content::Text(text) => json!(text),
        Content::Blocks(blocks) => {
            let kept: Vec<Value> = blocks
                .iter()
                .filter(|b| !matches!(b, ContentBlock::Binary { .. }))
                .filter_map(|b| serde_json::to_value(b).ok())
                .collect();
            if kept.is_empty() {
                // The API rejects empty content arrays.
                json!("")
            } else {
                json!(kept)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcore::BlockSource;

    #[test]
    fn system_turns_fold_into_channel() {
        let messages = vec![
            Message::system("be terse"),
            Message::user_text("hi"),
        ];
        let req = Request::new("claude-3-5-haiku-20241022", &messages, "global prompt");
        assert_eq!(req.system.as_deref(), Some("global prompt\nbe terse"));
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0]["role"], "user");
    }

    #[test]
    fn empty_system_is_omitted() {
        let messages = vec![Message::user_text("hi")];
        let req = Request::new("m", &messages, "");
        assert!(req.system.is_none());
    }

    #[test]
    fn user_blocks_pass_through_and_binary_drops() {
        let messages = vec![Message::user(vec![
            ContentBlock::Text { text: "see".into() },
            ContentBlock::Binary {
                source: BlockSource::base64("application/octet-stream", "AAAA"),
            },
            ContentBlock::Image {
                source: BlockSource::base64("image/png", "aGk="),
            },
        ])];
        let (_, wire) = to_anthropic(&messages);
        let content = wire[0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "image");
        assert_eq!(content[1]["source"]["media_type"], "image/png");
    }

    #[test]
    fn assistant_content_is_a_string() {
        let messages = vec![Message::assistant("sure")];
        let (_, wire) = to_anthropic(&messages);
        assert_eq!(wire[0]["content"], "sure");
    }
}
