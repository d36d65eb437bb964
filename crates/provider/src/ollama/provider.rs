//! Adapter implementation for the Ollama provider.

use super::Ollama;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use kcore::{Adapter, Error, Message, ModelDescriptor, Result, Role, TokenCount};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Ollama chat request body.
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

/// One response object; streaming mode delivers these as NDJSON lines.
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<WireContent>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct WireContent {
    #[serde(default)]
    content: String,
}

/// Flatten block content to plain strings joined with newlines — the
/// daemon only understands string content.
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

impl Adapter for Ollama {
    fn models(&self) -> Vec<ModelDescriptor> {
        self.models.clone()
    }

    fn current_model(&self) -> ModelDescriptor {
        self.models[self.current].clone()
    }

    /// Unknown ids are registered with local defaults instead of failing.
    fn select_model(&mut self, id: &str) -> Result<ModelDescriptor> {
        let index = match self.models.iter().position(|m| m.id == id) {
            Some(index) => index,
            None => {
                self.models.push(ModelDescriptor::local(id));
                self.models.len() - 1
            }
        };
        self.current = index;
        Ok(self.models[index].clone())
    }

    /// The daemon exposes no tokenizer; the fixed approximation never
    /// faults.
    async fn count_tokens(&self, messages: &[Message]) -> TokenCount {
        kcore::estimate_tokens(messages)
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let body = Body {
            model: self.current_model().id.to_string(),
            messages: to_wire(messages, ""),
            stream: false,
        };

        let response = self
            .client
            .request(Method::POST, &self.endpoint)
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
        let parsed: ChatResponse = serde_json::from_str(&text).map_err(Error::request)?;
        Ok(parsed.message.map(|m| m.content).unwrap_or_default())
    }

    fn stream_complete(
        &self,
        messages: &[Message],
        system: &str,
    ) -> impl Stream<Item = Result<String>> + Send {
        let body = Body {
            model: self.current_model().id.to_string(),
            messages: to_wire(messages, system),
            stream: true,
        };
        let request = self.client.request(Method::POST, &self.endpoint).json(&body);

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
            'outer: while let Some(bytes) = stream.next().await {
                let bytes = bytes.map_err(Error::request)?;
                buf.push_str(&String::from_utf8_lossy(&bytes));
                while let Some(pos) = buf.find('\n') {
                    let line = buf[..pos].trim().to_owned();
                    buf = buf[pos + 1..].to_owned();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<ChatResponse>(&line) {
                        Ok(chunk) => {
                            if let Some(message) = chunk.message {
                                if !message.content.is_empty() {
                                    yield message.content;
                                }
                            }
                            if chunk.done {
                                break 'outer;
                            }
                        }
                        Err(e) => {
                            tracing::warn!("failed to parse ollama chunk: {e}, data: {line}");
                        }
                    }
                }
            }
        }
    }
}
