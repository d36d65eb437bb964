//! Core types and traits for the Kelp chat client.
//!
//! Everything the provider adapters and the conversation store share lives
//! here: the message model, model descriptors and token accounting, the
//! [`Adapter`] contract every backend satisfies, the error taxonomy, and the
//! durable [`Storage`] abstraction.

pub use {
    adapter::Adapter,
    error::{Error, Result},
    message::{BlockSource, Content, ContentBlock, Message, Role, estimate_tokens},
    model::{ModelDescriptor, TokenCount},
    storage::{FileStore, MemoryStore, Storage},
};

mod adapter;
mod error;
mod message;
mod model;
mod storage;
