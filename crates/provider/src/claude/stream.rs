//! Streaming events for the Anthropic Messages API.

use serde::Deserialize;

/// A server-sent event from the streaming Messages API.
///
/// Only text deltas carry fragments; everything else (`message_start`,
/// `content_block_start`, `ping`, ...) is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum Event {
    ContentBlockDelta { delta: Delta },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

impl Event {
    /// The text fragment this event carries, if any.
    pub(super) fn into_text(self) -> Option<String> {
        match self {
            Self::ContentBlockDelta {
                delta: Delta::TextDelta { text },
            } => Some(text),
            _ => None,
        }
    }
}

/// Parse a single SSE block (may contain `event:` and `data:` lines) into a
/// text fragment.
pub(super) fn parse_sse_block(block: &str) -> Option<String> {
    let mut data_str = None;
    for line in block.lines() {
        if let Some(d) = line.strip_prefix("data: ") {
            data_str = Some(d.trim());
        }
    }
    let data = data_str?;

    match serde_json::from_str::<Event>(data) {
        Ok(event) => event.into_text().filter(|t| !t.is_empty()),
        Err(e) => {
            tracing::warn!("failed to parse anthropic event: {e}, data: {data}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_delta_yields_fragment() {
        let block = "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}";
        assert_eq!(parse_sse_block(block).as_deref(), Some("Hel"));
    }

    #[test]
    fn non_delta_events_are_ignored() {
        let block = "event: ping\ndata: {\"type\":\"ping\"}";
        assert!(parse_sse_block(block).is_none());

        let block = "event: message_stop\ndata: {\"type\":\"message_stop\"}";
        assert!(parse_sse_block(block).is_none());
    }

    #[test]
    fn malformed_data_is_skipped() {
        assert!(parse_sse_block("data: not json").is_none());
        assert!(parse_sse_block("event: only").is_none());
    }
}
