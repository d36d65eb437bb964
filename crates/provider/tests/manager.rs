//! Tests for `ProviderManager`.

use kcore::{Adapter, Error, Message};
use kelp_provider::{ManagerConfig, ProviderManager};

fn manager() -> ProviderManager {
    ProviderManager::new(ManagerConfig::default()).unwrap()
}

fn keyed_config() -> ManagerConfig {
    ManagerConfig {
        anthropic_api_key: Some("sk-test".into()),
        deepseek_api_key: Some("sk-test".into()),
        ..Default::default()
    }
}

#[test]
fn default_config_activates_ollama() {
    let manager = manager();
    assert_eq!(manager.current_provider().id, "ollama");
    assert_eq!(manager.current_provider().display_name, "Ollama");
    assert_eq!(manager.current_model().id, "gpt-oss:20b");
}

#[test]
fn providers_lists_the_closed_registry() {
    let providers = manager().providers();
    assert_eq!(providers.len(), 3);
    assert_eq!(providers["claude"], "Anthropic");
    assert_eq!(providers["deepseek"], "Deepseek");
    assert_eq!(providers["ollama"], "Ollama");
}

#[test]
fn select_provider_unknown_fails() {
    let manager = manager();
    let err = manager.select_provider("grok", None).unwrap_err();
    assert!(matches!(err, Error::ProviderNotFound(_)));
    // The active provider is untouched.
    assert_eq!(manager.current_provider().id, "ollama");
}

#[test]
fn select_provider_without_credentials_fails() {
    let manager = manager();
    let err = manager.select_provider("claude", None).unwrap_err();
    assert!(matches!(err, Error::ProviderConstruction { .. }));
    assert_eq!(manager.current_provider().id, "ollama");
}

#[test]
fn select_provider_switches_adapter_and_model() {
    let manager = ProviderManager::new(keyed_config()).unwrap();
    let info = manager
        .select_provider("claude", Some("claude-3-5-haiku-20241022"))
        .unwrap();
    assert_eq!(info.id, "claude");
    assert_eq!(info.display_name, "Anthropic");
    assert_eq!(manager.current_model().id, "claude-3-5-haiku-20241022");

    // Back to the local daemon; default model applies.
    manager.select_provider("ollama", None).unwrap();
    assert_eq!(manager.current_model().id, "gpt-oss:20b");
}

#[test]
fn select_model_is_delegated_to_the_active_adapter() {
    let mut manager = manager();

    // Local backend: an unknown id registers itself.
    let model = manager.select_model("gemma3n:e4b").unwrap();
    assert_eq!(model.context_window, 4096);
    assert!(manager.models().iter().any(|m| m.id == "gemma3n:e4b"));

    // Cloud backend: the same call is a catalog miss.
    let manager = ProviderManager::new(keyed_config()).unwrap();
    manager.select_provider("claude", None).unwrap();
    let mut manager = manager;
    let err = manager.select_model("gemma3n:e4b").unwrap_err();
    assert!(matches!(err, Error::ModelNotFound(_)));
}

#[test]
fn clones_share_the_active_selection() {
    let manager = ProviderManager::new(keyed_config()).unwrap();
    let clone = manager.clone();
    manager.select_provider("deepseek", None).unwrap();
    assert_eq!(clone.current_provider().id, "deepseek");
}

#[tokio::test]
async fn count_tokens_delegates_to_the_approximation() {
    let manager = manager();
    let messages = vec![
        Message::user_text("abcdefgh"), // 8 chars -> 2 input tokens
        Message::assistant("abcd"),     // 4 chars -> 1 output token
    ];
    let count = manager.count_tokens(&messages).await;
    assert_eq!(count.input_tokens, 2);
    assert_eq!(count.output_tokens, 1);
}

#[test]
fn config_model_is_selected_at_startup() {
    let config = ManagerConfig {
        model: Some("qwen2.5-coder:7b".into()),
        ..Default::default()
    };
    let manager = ProviderManager::new(config).unwrap();
    assert_eq!(manager.current_model().id, "qwen2.5-coder:7b");
}

#[test]
fn unknown_startup_provider_fails() {
    let config = ManagerConfig {
        provider: "bard".into(),
        ..Default::default()
    };
    let err = ProviderManager::new(config).unwrap_err();
    assert!(matches!(err, Error::ProviderNotFound(_)));
}
