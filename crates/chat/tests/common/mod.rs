//! A scripted adapter for driving the store without a real backend.

use futures_core::Stream;
use kcore::{Adapter, Error, Message, ModelDescriptor, Result, TokenCount};

/// Replays configured responses; fails on demand.
#[derive(Clone, Default)]
pub struct ScriptedAdapter {
    /// Returned by `complete`.
    pub reply: String,
    /// Yielded in order by `stream_complete`.
    pub fragments: Vec<String>,
    /// Yield an error after the fragments.
    pub fail_stream: bool,
    /// Make `complete` fail.
    pub fail_complete: bool,
}

impl ScriptedAdapter {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_owned(),
            ..Default::default()
        }
    }

    pub fn streaming(fragments: &[&str], reply: &str) -> Self {
        Self {
            reply: reply.to_owned(),
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl Adapter for ScriptedAdapter {
    fn models(&self) -> Vec<ModelDescriptor> {
        vec![ModelDescriptor::local("scripted")]
    }

    fn current_model(&self) -> ModelDescriptor {
        ModelDescriptor::local("scripted")
    }

    fn select_model(&mut self, id: &str) -> Result<ModelDescriptor> {
        Ok(ModelDescriptor::local(id))
    }

    async fn count_tokens(&self, messages: &[Message]) -> TokenCount {
        kcore::estimate_tokens(messages)
    }

    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        if self.fail_complete {
            Err(Error::request("scripted completion failure"))
        } else {
            Ok(self.reply.clone())
        }
    }

    fn stream_complete(
        &self,
        _messages: &[Message],
        _system: &str,
    ) -> impl Stream<Item = Result<String>> + Send {
        let fragments = self.fragments.clone();
        let fail = self.fail_stream;
        async_stream::stream! {
            for fragment in fragments {
                yield Ok(fragment);
            }
            if fail {
                yield Err(Error::request("scripted stream failure"));
            }
        }
    }
}
