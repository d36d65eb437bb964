//! Conversation store and streaming assembly for the Kelp chat client.
//!
//! [`ChatStore`] owns the set of conversations, persists every mutation as
//! one snapshot to a durable [`Storage`](kcore::Storage) key, and derives
//! chat titles through the provider. [`ChatStore::send`] drives a full
//! send-message flow, publishing the growing assistant reply through the
//! [`Assembler`] state machine.

pub use {
    conversation::{Conversation, DEFAULT_CHAT_NAME},
    store::{ChatStore, STORAGE_KEY},
    stream::{Assembler, Assembly, Phase, STREAM_FAILED_PLACEHOLDER},
};

mod conversation;
mod store;
mod stream;
mod title;
