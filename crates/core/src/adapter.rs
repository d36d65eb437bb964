//! The provider adapter contract.

use crate::error::Result;
use crate::message::Message;
use crate::model::{ModelDescriptor, TokenCount};
use futures_core::Stream;

/// A chat backend normalized to a common shape.
///
/// One implementation exists per backend family (cloud chat API, local
/// inference daemon); the manager and the conversation store only ever talk
/// to this trait. Constructors are inherent methods on each adapter and are
/// never called polymorphically — a constructor failure (missing
/// credentials, unreachable daemon) is fatal at selection time.
pub trait Adapter: Sized + Clone {
    /// The backend's model catalog.
    fn models(&self) -> Vec<ModelDescriptor>;

    /// The currently selected model.
    fn current_model(&self) -> ModelDescriptor;

    /// Select a model by id.
    ///
    /// Cloud backends fail with [`Error::ModelNotFound`](crate::Error) when
    /// the id is absent from the catalog; local backends auto-register
    /// unknown ids instead and never fail.
    fn select_model(&mut self, id: &str) -> Result<ModelDescriptor>;

    /// Count tokens across `messages`, user text into `input_tokens` and
    /// assistant text into `output_tokens`, using the backend's tokenizer or
    /// a deterministic approximation.
    ///
    /// Never fails: a tokenizer fault yields `{0, 0}` and is surfaced only
    /// as a log line.
    fn count_tokens(&self, messages: &[Message]) -> impl Future<Output = TokenCount> + Send;

    /// Single-shot completion; returns the full assistant text.
    fn complete(&self, messages: &[Message]) -> impl Future<Output = Result<String>> + Send;

    /// Streaming completion; yields text fragments in arrival order until
    /// the backend signals end-of-stream. The sequence is not restartable.
    ///
    /// A non-empty `system` is prepended as the first effective instruction
    /// the model sees, either as a role-`system` message or the backend's
    /// dedicated system channel.
    fn stream_complete(
        &self,
        messages: &[Message],
        system: &str,
    ) -> impl Stream<Item = Result<String>> + Send;
}
