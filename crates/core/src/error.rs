//! Error taxonomy shared across the workspace.

use compact_str::CompactString;
use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by providers and the manager.
///
/// Construction and selection errors propagate to the caller; request errors
/// propagate up to the streaming assembly, which converts them to a
/// user-visible placeholder. `TokenCount` never escapes an adapter's
/// `count_tokens` — it is logged and swallowed there.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested model id is absent from the active adapter's catalog.
    #[error("model '{0}' not found")]
    ModelNotFound(CompactString),

    /// The requested provider id is not in the closed registry.
    #[error("provider '{0}' not supported")]
    ProviderNotFound(CompactString),

    /// Adapter construction failed (missing credentials, bad endpoint).
    #[error("failed to initialize provider '{provider}': {reason}")]
    ProviderConstruction {
        provider: CompactString,
        reason: String,
    },

    /// A completion or stream request failed.
    #[error("provider request failed: {0}")]
    ProviderRequest(String),

    /// The backend tokenizer faulted.
    #[error("token counting failed: {0}")]
    TokenCount(String),
}

impl Error {
    /// Wrap a backend failure as a request error.
    pub fn request(err: impl std::fmt::Display) -> Self {
        Self::ProviderRequest(err.to_string())
    }

    /// Wrap a constructor failure for the named provider.
    pub fn construction(provider: impl Into<CompactString>, err: impl std::fmt::Display) -> Self {
        Self::ProviderConstruction {
            provider: provider.into(),
            reason: err.to_string(),
        }
    }

    /// Wrap a tokenizer fault.
    pub fn token_count(err: impl std::fmt::Display) -> Self {
        Self::TokenCount(err.to_string())
    }
}
