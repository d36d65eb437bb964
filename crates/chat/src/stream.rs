//! Streaming assembly: a growing assistant reply, published fragment by
//! fragment, committed once on normal exhaustion.

use crate::store::ChatStore;
use futures_core::Stream;
use futures_util::StreamExt;
use kcore::{Adapter, Content, Role, Storage};

/// Placeholder shown in place of a reply when the stream fails.
pub const STREAM_FAILED_PLACEHOLDER: &str = "Error: Failed to get response";

/// Assembly lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No pending assistant turn.
    Idle,
    /// Fragments are arriving.
    Streaming,
    /// The stream exhausted normally and the reply was taken.
    Completed,
    /// The stream surfaced an error; the partial was replaced by the
    /// placeholder.
    Failed,
}

/// Accumulates stream fragments into a growing reply.
///
/// Fragments append in arrival order and the partial is published after
/// every push — monotonic, order-preserving prefix growth, no batching
/// beyond what the transport delivers.
#[derive(Debug)]
pub struct Assembler {
    partial: String,
    phase: Phase,
}

impl Assembler {
    /// A fresh, idle assembler.
    pub fn new() -> Self {
        Self {
            partial: String::new(),
            phase: Phase::Idle,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The live partial value.
    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// Append a fragment and return the grown partial.
    pub fn push(&mut self, fragment: &str) -> &str {
        self.phase = Phase::Streaming;
        self.partial.push_str(fragment);
        &self.partial
    }

    /// Finish normally: the accumulated reply is taken and the live
    /// partial state cleared.
    pub fn complete(&mut self) -> String {
        self.phase = Phase::Completed;
        std::mem::take(&mut self.partial)
    }

    /// Finish on error: the partial is replaced by the placeholder.
    /// Nothing is committed.
    pub fn fail(&mut self) -> &str {
        self.phase = Phase::Failed;
        self.partial.clear();
        self.partial.push_str(STREAM_FAILED_PLACEHOLDER);
        &self.partial
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

/// One published assembly state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    /// The partial reply after a fragment arrived.
    Streaming(String),
    /// The committed reply; the assistant turn has been appended.
    Completed(String),
    /// The stream failed; nothing was committed and this placeholder
    /// stands in for the missing assistant turn.
    Failed(String),
}

impl<S: Storage, P: Adapter> ChatStore<S, P> {
    /// Run a full send-message flow against a conversation.
    ///
    /// Appends the user turn, streams a reply with the accumulated context
    /// and system prompt, and publishes the assembly state after every
    /// fragment. On normal exhaustion the reply is committed as the
    /// assistant turn (persisting, possibly deriving a title); on error the
    /// placeholder is published and no assistant turn is committed — the
    /// user turn stays recorded.
    ///
    /// There is no cancellation: once started, the stream runs to
    /// completion or failure. Concurrent sends against one conversation
    /// are not guarded against; the last writer wins.
    pub fn send<'a>(
        &'a mut self,
        id: &str,
        content: Content,
    ) -> impl Stream<Item = Assembly> + use<'a, S, P> {
        let id = id.to_owned();
        async_stream::stream! {
            self.append(&id, content, Role::User).await;

            let (context, system) = match self.chats.get(&id) {
                Some(c) => (c.context.clone(), c.system.clone()),
                None => return,
            };

            // The adapter clone pins this stream to the provider selected
            // at send time; a mid-stream provider switch only affects the
            // next send.
            let provider = self.provider.clone();
            let mut assembler = Assembler::new();
            let mut failed = false;

            {
                let mut inner = std::pin::pin!(provider.stream_complete(&context, &system));
                while let Some(item) = inner.next().await {
                    match item {
                        Ok(fragment) => {
                            yield Assembly::Streaming(assembler.push(&fragment).to_owned());
                        }
                        Err(e) => {
                            tracing::error!("error receiving message: {e}");
                            yield Assembly::Failed(assembler.fail().to_owned());
                            failed = true;
                            break;
                        }
                    }
                }
            }

            if !failed {
                let reply = assembler.complete();
                self.append(&id, Content::Text(reply.clone()), Role::Assistant)
                    .await;
                yield Assembly::Completed(reply);
            }
        }
    }
}
