//! Adapter implementation for the DeepSeek provider.

use super::DeepSeek;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use kcore::{Adapter, Error, Message, ModelDescriptor, Result, Role, TokenCount};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completions request body.
#[derive(Serialize)]
struct Body {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<WireContent>,
    #[serde(default)]
    delta: Option<WireContent>,
}

#[derive(Deserialize)]
struct WireContent {
    #[serde(default)]
    content: Option<String>,
}

/// Flatten messages to the string-content wire form, prepending a non-empty
/// `system` as a role-`system` message.
fn to_wire(messages: &[Message], system: &str) -> Vec<WireMessage> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    if !system.is_empty() {
        wire.push(WireMessage {
            role: "system",
            content: system.to_owned(),
        });
    }
    for msg in messages {
        wire.push(WireMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            },
            content: msg.content.text_joined("\n"),
        });
    }
    wire
}

impl Adapter for DeepSeek {
    fn models(&self) -> Vec<ModelDescriptor> {
        Self::catalog()
    }

    fn current_model(&self) -> ModelDescriptor {
        self.model.clone()
    }

    fn select_model(&mut self, id: &str) -> Result<ModelDescriptor> {
        match Self::catalog().into_iter().find(|m| m.id == id) {
            Some(model) => {
                self.model = model.clone();
                Ok(model)
            }
            None => Err(Error::ModelNotFound(id.into())),
        }
    }

    /// No token-counting endpoint; the fixed approximation never faults.
    async fn count_tokens(&self, messages: &[Message]) -> TokenCount {
        kcore::estimate_tokens(messages)
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let body = Body {
            model: self.model.id.to_string(),
            messages: to_wire(messages, ""),
            stream: false,
        };

        let response = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(Error::request)?;

        let status = response.status();
        let text = response.text().await.map_err(Error::request)?;
        if !status.is_success() {
            return Err(Error::request(format!("HTTP {status}: {text}")));
        }

        tracing::trace!("response: {text}");
        let completion: Completion = serde_json::from_str(&text).map_err(Error::request)?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.and_then(|m| m.content))
            .unwrap_or_default())
    }

    fn stream_complete(
        &self,
        messages: &[Message],
        system: &str,
    ) -> impl Stream<Item = Result<String>> + Send {
        let body = Body {
            model: self.model.id.to_string(),
            messages: to_wire(messages, system),
            stream: true,
        };
        let request = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(&body);

        try_stream! {
            let response = request.send().await.map_err(Error::request)?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                Err(Error::request(format!("HTTP {status}: {text}")))?;
                return;
            }

            let mut stream = response.bytes_stream();
            let mut buf = String::new();
            while let Some(bytes) = stream.next().await {
                let bytes = bytes.map_err(Error::request)?;
                buf.push_str(&String::from_utf8_lossy(&bytes));
                while let Some(pos) = buf.find('\n') {
                    let line = buf[..pos].trim().to_owned();
                    buf = buf[pos + 1..].to_owned();
                    if let Some(fragment) = parse_sse_line(&line) {
                        yield fragment;
                    }
                }
            }
        }
    }
}

/// Parse one `data:` line into a delta fragment. `[DONE]` and non-data
/// lines yield nothing.
fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<Completion>(data) {
        Ok(completion) => completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.and_then(|d| d.content))
            .filter(|s| !s.is_empty()),
        Err(e) => {
            tracing::warn!("failed to parse deepseek chunk: {e}, data: {data}");
            None
        }
    }
}
