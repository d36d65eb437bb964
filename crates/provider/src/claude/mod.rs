//! Claude (Anthropic) provider adapter.
//!
//! Implements the Anthropic Messages API, which differs from the OpenAI
//! chat completions format in message structure, the dedicated top-level
//! system channel, and streaming events.

use kcore::{Error, ModelDescriptor, Result};
use reqwest::{Client, header::HeaderMap};

mod provider;
mod request;
mod stream;

pub(crate) use request::Request;

/// The Anthropic Messages API endpoint.
pub const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// The Anthropic API version header value.
const API_VERSION: &str = "2023-06-01";

/// Catalog default.
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// The Claude provider adapter.
#[derive(Clone, Debug)]
pub struct Claude {
    /// The HTTP client.
    pub client: Client,
    /// Request headers (x-api-key, anthropic-version, content-type).
    headers: HeaderMap,
    /// Messages API endpoint URL.
    endpoint: String,
    /// Currently selected model.
    model: ModelDescriptor,
}

impl Claude {
    /// Create an adapter targeting the Anthropic API.
    pub fn anthropic(client: Client, key: &str) -> Result<Self> {
        Self::custom(client, key, ENDPOINT)
    }

    /// Create an adapter targeting a custom Anthropic-compatible endpoint.
    pub fn custom(client: Client, key: &str, endpoint: &str) -> Result<Self> {
        use reqwest::header;

        if key.is_empty() {
            return Err(Error::construction(
                "claude",
                "missing API key (set ANTHROPIC_API_KEY)",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            "application/json"
                .parse()
                .map_err(|e| Error::construction("claude", e))?,
        );
        headers.insert(
            "x-api-key",
            key.parse().map_err(|e| Error::construction("claude", e))?,
        );
        headers.insert(
            "anthropic-version",
            API_VERSION
                .parse()
                .map_err(|e| Error::construction("claude", e))?,
        );

        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
            model: Self::catalog()
                .into_iter()
                .find(|m| m.id == DEFAULT_MODEL)
                .expect("default model is in the catalog"),
        })
    }

    /// The static model catalog.
    pub fn catalog() -> Vec<ModelDescriptor> {
        vec![
            ModelDescriptor {
                id: "claude-3-7-sonnet-20250219".into(),
                display_name: "Claude 3.7 Sonnet".into(),
                context_window: 200_000,
                input_token_cost: 3.0,
                output_token_cost: 15.0,
            },
            ModelDescriptor {
                id: "claude-3-5-haiku-20241022".into(),
                display_name: "Claude 3.5 Haiku".into(),
                context_window: 200_000,
                input_token_cost: 1.0,
                output_token_cost: 5.0,
            },
        ]
    }

    /// Token-counting endpoint derived from the messages endpoint.
    fn count_endpoint(&self) -> String {
        format!("{}/count_tokens", self.endpoint)
    }
}
