//! Model descriptors and token accounting.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A model offered by a provider.
///
/// Descriptors are immutable once defined and identified by `id`. Costs are
/// in USD per one million tokens.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelDescriptor {
    /// Backend model identifier.
    pub id: CompactString,
    /// Human-readable name shown in the model picker.
    pub display_name: CompactString,
    /// Context window in tokens.
    pub context_window: u32,
    /// USD per 1M input tokens.
    pub input_token_cost: f64,
    /// USD per 1M output tokens.
    pub output_token_cost: f64,
}

impl ModelDescriptor {
    /// Descriptor for a runtime-registered local model: the id doubles as
    /// the display name, a conservative 4096-token window, zero cost.
    pub fn local(id: impl Into<CompactString>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            context_window: 4096,
            input_token_cost: 0.0,
            output_token_cost: 0.0,
        }
    }

    /// Estimated cost in USD for the given usage.
    pub fn cost(&self, tokens: &TokenCount) -> f64 {
        self.input_token_cost * 1e-6 * f64::from(tokens.input_tokens)
            + self.output_token_cost * 1e-6 * f64::from(tokens.output_tokens)
    }
}

/// Token usage split by direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenCount {
    /// Tokens attributed to user-role content.
    pub input_tokens: u32,
    /// Tokens attributed to assistant-role content.
    pub output_tokens: u32,
}

impl TokenCount {
    /// Total tokens across both directions.
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}
