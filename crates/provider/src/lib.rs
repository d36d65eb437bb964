//! LLM provider adapters for the Kelp chat client.
//!
//! One adapter per backend family (Claude, DeepSeek, Ollama), a closed
//! [`Provider`] enum with enum dispatch, and the [`ProviderManager`] facade
//! the rest of the workspace talks to.

pub use {
    claude::Claude,
    config::ManagerConfig,
    deepseek::DeepSeek,
    manager::{ProviderInfo, ProviderManager},
    ollama::Ollama,
    provider::{Provider, ProviderKind, build_provider},
};

mod claude;
mod config;
mod deepseek;
mod manager;
mod ollama;
mod provider;
