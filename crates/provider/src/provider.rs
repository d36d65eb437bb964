//! The unified `Provider` enum with enum dispatch over concrete backends.
//!
//! The provider hierarchy is a closed set: adding a backend means adding a
//! variant here plus its adapter module. `build_provider()` is the single
//! construction point the manager goes through.

use crate::claude::Claude;
use crate::config::ManagerConfig;
use crate::deepseek::DeepSeek;
use crate::ollama::Ollama;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use kcore::{Adapter, Error, Message, ModelDescriptor, Result, TokenCount};

/// The closed registry of backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Anthropic Messages API.
    Claude,
    /// DeepSeek's OpenAI-compatible API.
    DeepSeek,
    /// Local inference via an Ollama daemon.
    Ollama,
}

impl ProviderKind {
    /// Every registered kind, in registry order.
    pub const fn all() -> [ProviderKind; 3] {
        [Self::Claude, Self::DeepSeek, Self::Ollama]
    }

    /// Stable provider id.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::DeepSeek => "deepseek",
            Self::Ollama => "ollama",
        }
    }

    /// Human-readable provider name.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Claude => "Anthropic",
            Self::DeepSeek => "Deepseek",
            Self::Ollama => "Ollama",
        }
    }

    /// Look up a kind by id.
    pub fn from_id(id: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| Error::ProviderNotFound(id.into()))
    }
}

/// Unified provider adapter.
#[derive(Clone, Debug)]
pub enum Provider {
    /// Anthropic Messages API.
    Claude(Claude),
    /// DeepSeek API.
    DeepSeek(DeepSeek),
    /// Local Ollama daemon.
    Ollama(Ollama),
}

/// Construct a fresh adapter for `kind`, selecting `model` when given
/// (each backend's default otherwise).
///
/// Constructor failures — missing credentials, a bad daemon address, an
/// unknown model on a cloud backend — surface here, at selection time.
pub fn build_provider(
    kind: ProviderKind,
    model: Option<&str>,
    config: &ManagerConfig,
    client: reqwest::Client,
) -> Result<Provider> {
    let mut provider = match kind {
        ProviderKind::Claude => {
            let key = config.anthropic_api_key.as_deref().unwrap_or_default();
            Provider::Claude(Claude::anthropic(client, key)?)
        }
        ProviderKind::DeepSeek => {
            let key = config.deepseek_api_key.as_deref().unwrap_or_default();
            Provider::DeepSeek(DeepSeek::api(client, key)?)
        }
        ProviderKind::Ollama => match config.ollama_url.as_deref() {
            Some(base) => Provider::Ollama(Ollama::custom(client, base)?),
            None => Provider::Ollama(Ollama::local(client)?),
        },
    };

    if let Some(id) = model {
        provider.select_model(id)?;
    }
    Ok(provider)
}

impl Adapter for Provider {
    fn models(&self) -> Vec<ModelDescriptor> {
        match self {
            Self::Claude(p) => p.models(),
            Self::DeepSeek(p) => p.models(),
            Self::Ollama(p) => p.models(),
        }
    }

    fn current_model(&self) -> ModelDescriptor {
        match self {
            Self::Claude(p) => p.current_model(),
            Self::DeepSeek(p) => p.current_model(),
            Self::Ollama(p) => p.current_model(),
        }
    }

    fn select_model(&mut self, id: &str) -> Result<ModelDescriptor> {
        match self {
            Self::Claude(p) => p.select_model(id),
            Self::DeepSeek(p) => p.select_model(id),
            Self::Ollama(p) => p.select_model(id),
        }
    }

    async fn count_tokens(&self, messages: &[Message]) -> TokenCount {
        match self {
            Self::Claude(p) => p.count_tokens(messages).await,
            Self::DeepSeek(p) => p.count_tokens(messages).await,
            Self::Ollama(p) => p.count_tokens(messages).await,
        }
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        match self {
            Self::Claude(p) => p.complete(messages).await,
            Self::DeepSeek(p) => p.complete(messages).await,
            Self::Ollama(p) => p.complete(messages).await,
        }
    }

    fn stream_complete(
        &self,
        messages: &[Message],
        system: &str,
    ) -> impl Stream<Item = Result<String>> + Send {
        let this = self.clone();
        let messages = messages.to_vec();
        let system = system.to_owned();
        try_stream! {
            match this {
                Provider::Claude(p) => {
                    let mut stream = std::pin::pin!(p.stream_complete(&messages, &system));
                    while let Some(fragment) = stream.next().await {
                        yield fragment?;
                    }
                }
                Provider::DeepSeek(p) => {
                    let mut stream = std::pin::pin!(p.stream_complete(&messages, &system));
                    while let Some(fragment) = stream.next().await {
                        yield fragment?;
                    }
                }
                Provider::Ollama(p) => {
                    let mut stream = std::pin::pin!(p.stream_complete(&messages, &system));
                    while let Some(fragment) = stream.next().await {
                        yield fragment?;
                    }
                }
            }
        }
    }
}
