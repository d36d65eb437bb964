//! Manager configuration.
//!
//! Loaded from an optional TOML file, with credentials and the daemon
//! address overridable through the environment.

use anyhow::Context;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the provider manager.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Provider id selected at startup.
    pub provider: CompactString,

    /// Model id selected at startup (the provider's default when absent).
    pub model: Option<CompactString>,

    /// Anthropic API key.
    pub anthropic_api_key: Option<String>,

    /// DeepSeek API key.
    pub deepseek_api_key: Option<String>,

    /// Ollama daemon address (defaults to the local daemon).
    pub ollama_url: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            provider: CompactString::const_new("ollama"),
            model: None,
            anthropic_api_key: None,
            deepseek_api_key: None,
            ollama_url: None,
        }
    }
}

impl ManagerConfig {
    /// Load config if the file exists, otherwise return `Ok(None)`.
    pub fn load_optional(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e))
                    .with_context(|| format!("failed to read config: {}", path.display()));
            }
        };

        let s = String::from_utf8(bytes).context("config is not valid UTF-8")?;
        let config: Self = toml::from_str(&s)
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?;
        Ok(Some(config))
    }

    /// Fill unset credentials and the daemon address from the environment
    /// (`ANTHROPIC_API_KEY`, `DEEPSEEK_API_KEY`, `OLLAMA_URL`).
    pub fn apply_env(mut self) -> Self {
        if self.anthropic_api_key.is_none() {
            self.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if self.deepseek_api_key.is_none() {
            self.deepseek_api_key = std::env::var("DEEPSEEK_API_KEY").ok();
        }
        if self.ollama_url.is_none() {
            self.ollama_url = std::env::var("OLLAMA_URL").ok();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ManagerConfig::load_optional(dir.path().join("kelp.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn parses_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kelp.toml");
        std::fs::write(&path, "provider = \"claude\"\nanthropic_api_key = \"sk-test\"\n")
            .unwrap();

        let config = ManagerConfig::load_optional(&path).unwrap().unwrap();
        assert_eq!(config.provider, "claude");
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert!(config.model.is_none());
        assert!(config.ollama_url.is_none());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kelp.toml");
        std::fs::write(&path, "provider = [").unwrap();
        assert!(ManagerConfig::load_optional(&path).is_err());
    }
}
