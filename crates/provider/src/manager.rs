//! `ProviderManager` — the single facade the conversation store and the
//! presentation layer talk to.
//!
//! Holds the active provider kind and its adapter instance behind an
//! `RwLock`. Delegating calls clone the adapter out of the lock first, so
//! a provider switch takes effect on the *next* call and never disturbs a
//! stream already in flight — the abandoned adapter runs its stream to
//! completion on its own clone.

use crate::config::ManagerConfig;
use crate::provider::{Provider, ProviderKind, build_provider};
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use kcore::{Adapter, Message, ModelDescriptor, Result, TokenCount};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Manages the closed provider registry with an active selection.
pub struct ProviderManager {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    /// Kind of the currently active provider.
    active: ProviderKind,
    /// The active adapter instance.
    adapter: Provider,
    /// Construction-time settings for building fresh adapters.
    config: ManagerConfig,
    /// Shared HTTP client.
    client: reqwest::Client,
}

/// Identity of a provider entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Stable provider id.
    pub id: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
}

impl From<ProviderKind> for ProviderInfo {
    fn from(kind: ProviderKind) -> Self {
        Self {
            id: kind.id(),
            display_name: kind.display_name(),
        }
    }
}

impl ProviderManager {
    /// Create a manager from config, building the configured provider
    /// (and model, when set) as the active adapter.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let client = reqwest::Client::new();
        let kind = ProviderKind::from_id(&config.provider)?;
        let adapter = build_provider(kind, config.model.as_deref(), &config, client.clone())?;

        Ok(Self {
            inner: Arc::new(RwLock::new(Inner {
                active: kind,
                adapter,
                config,
                client,
            })),
        })
    }

    /// All registered providers, id → display name.
    pub fn providers(&self) -> BTreeMap<&'static str, &'static str> {
        ProviderKind::all()
            .into_iter()
            .map(|kind| (kind.id(), kind.display_name()))
            .collect()
    }

    /// Identity of the active provider.
    pub fn current_provider(&self) -> ProviderInfo {
        let inner = self.inner.read().expect("provider lock poisoned");
        inner.active.into()
    }

    /// Switch to a different provider by id, constructing a fresh adapter
    /// (with `model` selected when given, the backend default otherwise)
    /// and replacing the previous one.
    ///
    /// The previous adapter's in-flight requests are not cancelled, only
    /// abandoned. Returns the new active identity.
    pub fn select_provider(&self, id: &str, model: Option<&str>) -> Result<ProviderInfo> {
        let kind = ProviderKind::from_id(id)?;
        let (config, client) = {
            let inner = self.inner.read().expect("provider lock poisoned");
            (inner.config.clone(), inner.client.clone())
        };

        let adapter = build_provider(kind, model, &config, client)?;

        let mut inner = self.inner.write().expect("provider lock poisoned");
        inner.active = kind;
        inner.adapter = adapter;
        Ok(kind.into())
    }

    /// Get a clone of the active adapter. Callers never hold the lock
    /// while performing LLM calls.
    fn active(&self) -> Provider {
        let inner = self.inner.read().expect("provider lock poisoned");
        inner.adapter.clone()
    }
}

impl Adapter for ProviderManager {
    fn models(&self) -> Vec<ModelDescriptor> {
        self.active().models()
    }

    fn current_model(&self) -> ModelDescriptor {
        self.active().current_model()
    }

    fn select_model(&mut self, id: &str) -> Result<ModelDescriptor> {
        let mut inner = self.inner.write().expect("provider lock poisoned");
        inner.adapter.select_model(id)
    }

    fn count_tokens(&self, messages: &[Message]) -> impl Future<Output = TokenCount> + Send {
        let adapter = self.active();
        let messages = messages.to_vec();
        async move { adapter.count_tokens(&messages).await }
    }

    fn complete(&self, messages: &[Message]) -> impl Future<Output = Result<String>> + Send {
        let adapter = self.active();
        let messages = messages.to_vec();
        async move { adapter.complete(&messages).await }
    }

    fn stream_complete(
        &self,
        messages: &[Message],
        system: &str,
    ) -> impl Stream<Item = Result<String>> + Send {
        let adapter = self.active();
        let messages = messages.to_vec();
        let system = system.to_owned();
        try_stream! {
            let mut stream = std::pin::pin!(adapter.stream_complete(&messages, &system));
            while let Some(fragment) = stream.next().await {
                yield fragment?;
            }
        }
    }
}

impl std::fmt::Debug for ProviderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("provider lock poisoned");
        f.debug_struct("ProviderManager")
            .field("active", &inner.active)
            .finish()
    }
}

impl Clone for ProviderManager {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
