//! Adapter implementation for the Claude provider.

use super::stream::parse_sse_block;
use super::{Claude, Request, request::to_anthropic};
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use kcore::{Adapter, Error, Message, ModelDescriptor, Result, Role, TokenCount};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

/// Raw Anthropic non-streaming response.
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct CountResponse {
    input_tokens: u32,
}

impl Adapter for Claude {
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

    async fn count_tokens(&self, messages: &[Message]) -> TokenCount {
        match self.try_count(messages).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("error counting tokens: {e}");
                TokenCount::default()
            }
        }
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let body = Request::new(&self.model.id, messages, "");
        tracing::trace!("request: {}", serde_json::to_string(&body).map_err(Error::request)?);

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
        let raw: AnthropicResponse = serde_json::from_str(&text).map_err(Error::request)?;
        Ok(to_text(raw))
    }

    fn stream_complete(
        &self,
        messages: &[Message],
        system: &str,
    ) -> impl Stream<Item = Result<String>> + Send {
        let body = Request::new(&self.model.id, messages, system).stream();
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
                while let Some(pos) = buf.find("\n\n") {
                    let block = buf[..pos].to_owned();
                    buf = buf[pos + 2..].to_owned();
                    if let Some(fragment) = parse_sse_block(&block) {
                        yield fragment;
                    }
                }
            }
            // Handle any remaining data in the buffer.
            if !buf.trim().is_empty() {
                if let Some(fragment) = parse_sse_block(&buf) {
                    yield fragment;
                }
            }
        }
    }
}

impl Claude {
    async fn try_count(&self, messages: &[Message]) -> Result<TokenCount> {
        let user: Vec<Message> = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .cloned()
            .collect();
        let assistant: Vec<Message> = messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .cloned()
            .collect();

        Ok(TokenCount {
            input_tokens: self.count_group(&user).await?,
            output_tokens: self.count_group(&assistant).await?,
        })
    }

    /// Count one role group through the `count_tokens` endpoint. Empty
    /// groups are zero without a request.
    async fn count_group(&self, messages: &[Message]) -> Result<u32> {
        if messages.is_empty() {
            return Ok(0);
        }

        let (_, wire) = to_anthropic(messages);
        let body = json!({
            "model": self.model.id,
            "messages": wire,
        });

        let response = self
            .client
            .request(Method::POST, self.count_endpoint())
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(Error::token_count)?;

        let status = response.status();
        let text = response.text().await.map_err(Error::token_count)?;
        if !status.is_success() {
            return Err(Error::token_count(format!("HTTP {status}: {text}")));
        }

        let counted: CountResponse = serde_json::from_str(&text).map_err(Error::token_count)?;
        Ok(counted.input_tokens)
    }
}

/// Concatenate the text blocks of a response.
fn to_text(raw: AnthropicResponse) -> String {
    let mut out = String::new();
    for block in raw.content {
        if let ResponseBlock::Text { text } = block {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    fn adapter() -> Claude {
        Claude::anthropic(Client::new(), "test-key").unwrap()
    }

    #[test]
    fn catalog_has_priced_models() {
        let models = adapter().models();
        assert_eq!(models.len(), 2);
        let sonnet = models.iter().find(|m| m.id == super::super::DEFAULT_MODEL).unwrap();
        assert_eq!(sonnet.display_name, "Claude 3.7 Sonnet");
        assert_eq!(sonnet.context_window, 200_000);
        assert_eq!(sonnet.input_token_cost, 3.0);
        assert_eq!(sonnet.output_token_cost, 15.0);
    }

    #[test]
    fn select_model_rejects_unknown() {
        let mut claude = adapter();
        let err = claude.select_model("gpt-4o").unwrap_err();
        assert!(matches!(err, Error::ModelNotFound(_)));
        // Selection failure leaves the current model untouched.
        assert_eq!(claude.current_model().id, super::super::DEFAULT_MODEL);
    }

    #[test]
    fn select_model_switches_within_catalog() {
        let mut claude = adapter();
        let haiku = claude.select_model("claude-3-5-haiku-20241022").unwrap();
        assert_eq!(haiku.display_name, "Claude 3.5 Haiku");
        assert_eq!(claude.current_model().id, "claude-3-5-haiku-20241022");
    }

    #[test]
    fn construction_requires_key() {
        let err = Claude::anthropic(Client::new(), "").unwrap_err();
        assert!(matches!(err, Error::ProviderConstruction { .. }));
    }

    #[tokio::test]
    async fn count_tokens_swallows_transport_failure() {
        // Unroutable endpoint: the request fails, the count comes back zero.
        let claude = Claude::custom(Client::new(), "k", "http://127.0.0.1:9/v1/messages").unwrap();
        let count = claude.count_tokens(&[Message::user_text("hello")]).await;
        assert_eq!(count, TokenCount::default());
    }

    #[tokio::test]
    async fn count_tokens_empty_input_is_zero_without_requests() {
        let claude = Claude::custom(Client::new(), "k", "http://127.0.0.1:9/v1/messages").unwrap();
        let count = claude.count_tokens(&[]).await;
        assert_eq!(count, TokenCount::default());
    }
}
