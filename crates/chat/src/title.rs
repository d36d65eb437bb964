//! Title derivation probe.

use kcore::{ContentBlock, Message};

/// Instruction sent after the first exchange to derive a title.
const TITLE_PROMPT: &str = "Using the first couple of messages, create a concise name for this chat relevant to the discussion. Avoid including words referencing 'chat' or 'discussion'. Respond with only the chat name and nothing else.";

/// Build the 3-turn probe: the first exchange plus the fixed instruction.
pub(crate) fn probe(user_text: &str, assistant_text: &str) -> Vec<Message> {
    vec![
        Message {
            role: kcore::Role::User,
            content: user_text.into(),
        },
        Message::assistant(assistant_text),
        Message::user(vec![ContentBlock::Text {
            text: TITLE_PROMPT.to_owned(),
        }]),
    ]
}

/// Normalize a derived title: trimmed and upper-cased.
pub(crate) fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}
