//! DeepSeek provider adapter.
//!
//! Speaks the OpenAI-compatible chat completions API at
//! `api.deepseek.com`. Token counting uses the deterministic
//! characters-per-token approximation from `kcore`.

use kcore::{Error, ModelDescriptor, Result};
use reqwest::{Client, header::HeaderMap};

mod provider;

/// The DeepSeek chat completions endpoint.
pub const ENDPOINT: &str = "https://api.deepseek.com/chat/completions";

/// Catalog default.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// The DeepSeek provider adapter.
#[derive(Clone, Debug)]
pub struct DeepSeek {
    /// The HTTP client.
    pub client: Client,
    /// Request headers (authorization, content-type).
    headers: HeaderMap,
    /// Chat completions endpoint URL.
    endpoint: String,
    /// Currently selected model.
    model: ModelDescriptor,
}

impl DeepSeek {
    /// Create an adapter targeting the DeepSeek API.
    pub fn api(client: Client, key: &str) -> Result<Self> {
        Self::custom(client, key, ENDPOINT)
    }

    /// Create an adapter targeting a custom OpenAI-compatible endpoint.
    pub fn custom(client: Client, key: &str, endpoint: &str) -> Result<Self> {
        use reqwest::header;

        if key.is_empty() {
            return Err(Error::construction(
                "deepseek",
                "missing API key (set DEEPSEEK_API_KEY)",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            "application/json"
                .parse()
                .map_err(|e| Error::construction("deepseek", e))?,
        );
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {key}")
                .parse()
                .map_err(|e| Error::construction("deepseek", e))?,
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
        vec![ModelDescriptor {
            id: "deepseek-chat".into(),
            display_name: "Deepseek V3".into(),
            context_window: 64_000,
            input_token_cost: 0.27,
            output_token_cost: 1.1,
        }]
    }
}
