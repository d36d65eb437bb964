//! Ollama provider adapter.
//!
//! Talks to a self-hosted Ollama daemon over its native chat API. All
//! models are zero-cost; the catalog is extensible at runtime — selecting
//! an unknown model id registers it instead of failing.

use kcore::{Error, ModelDescriptor, Result};
use reqwest::Client;

mod provider;

/// Default daemon address.
pub const BASE_URL: &str = "http://localhost:11434";

/// Catalog default.
pub const DEFAULT_MODEL: &str = "gpt-oss:20b";

/// The Ollama provider adapter.
#[derive(Clone, Debug)]
pub struct Ollama {
    /// The HTTP client.
    pub client: Client,
    /// Chat endpoint URL (`{base}/api/chat`).
    endpoint: String,
    /// Model catalog, including runtime-registered entries.
    models: Vec<ModelDescriptor>,
    /// Index of the currently selected model.
    current: usize,
}

impl Ollama {
    /// Create an adapter targeting the local daemon.
    pub fn local(client: Client) -> Result<Self> {
        Self::custom(client, BASE_URL)
    }

    /// Create an adapter targeting a daemon at `base`.
    pub fn custom(client: Client, base: &str) -> Result<Self> {
        // A bad daemon address is a construction failure, not a deferred
        // request failure.
        reqwest::Url::parse(base).map_err(|e| Error::construction("ollama", e))?;

        let models = Self::catalog();
        let current = models
            .iter()
            .position(|m| m.id == DEFAULT_MODEL)
            .expect("default model is in the catalog");

        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", base.trim_end_matches('/')),
            models,
            current,
        })
    }

    /// The seed model catalog.
    pub fn catalog() -> Vec<ModelDescriptor> {
        vec![
            ModelDescriptor {
                id: "gpt-oss:20b".into(),
                display_name: "GPT OSS".into(),
                context_window: 128_000,
                input_token_cost: 0.0,
                output_token_cost: 0.0,
            },
            ModelDescriptor {
                id: "qwen2.5-coder:7b".into(),
                display_name: "Qwen 2.5 Coder 7b".into(),
                context_window: 128_000,
                input_token_cost: 0.0,
                output_token_cost: 0.0,
            },
        ]
    }
}
