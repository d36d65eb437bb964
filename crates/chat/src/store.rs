//! The conversation store.

use crate::conversation::{Conversation, DEFAULT_CHAT_NAME};
use crate::title;
use kcore::{Adapter, Content, Message, Role, Storage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage key the snapshot persists under.
pub const STORAGE_KEY: &str = ".chat_history";

/// Persisted form: the full conversation map plus the current pointer.
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    chats: BTreeMap<String, Conversation>,
    #[serde(default)]
    current: Option<String>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    chats: &'a BTreeMap<String, Conversation>,
    current: &'a Option<String>,
}

/// Owns all conversations and the current selection, persisting every
/// mutation synchronously as one full snapshot.
///
/// State is explicit: callers hold the store (and its provider handle) and
/// pass it around — there are no process-wide globals. The provider is
/// generic so tests drive the store with a scripted adapter.
pub struct ChatStore<S: Storage, P: Adapter> {
    pub(crate) storage: S,
    pub(crate) key: String,
    pub(crate) chats: BTreeMap<String, Conversation>,
    pub(crate) current: Option<String>,
    pub(crate) provider: P,
}

impl<S: Storage, P: Adapter> ChatStore<S, P> {
    /// Open a store over `storage` under the default key.
    pub fn new(storage: S, provider: P) -> Self {
        Self::with_key(storage, provider, STORAGE_KEY)
    }

    /// Open a store over `storage` under `key`, loading any persisted
    /// snapshot. A corrupt blob is treated as no data.
    pub fn with_key(storage: S, provider: P, key: &str) -> Self {
        let snapshot = match storage.get(key) {
            Some(blob) => match serde_json::from_str::<Snapshot>(&blob) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("error loading chat data: {e}");
                    Snapshot::default()
                }
            },
            None => Snapshot::default(),
        };

        Self {
            storage,
            key: key.to_owned(),
            chats: snapshot.chats,
            current: snapshot.current,
            provider,
        }
    }

    /// Write the full snapshot through one storage call.
    pub(crate) fn persist(&mut self) {
        let snapshot = SnapshotRef {
            chats: &self.chats,
            current: &self.current,
        };
        match serde_json::to_string(&snapshot) {
            Ok(blob) => self.storage.set(&self.key, &blob),
            Err(e) => tracing::error!("error saving chat data: {e}"),
        }
    }

    /// Create a fresh conversation, make it current, persist.
    pub fn create(&mut self) -> Conversation {
        let conversation = Conversation::new();
        self.current = Some(conversation.id.clone());
        self.chats
            .insert(conversation.id.clone(), conversation.clone());
        self.persist();
        conversation
    }

    /// Load a conversation by id, making it current. An absent id behaves
    /// exactly as [`create`](Self::create) — loading never fails with
    /// not-found.
    pub fn load(&mut self, id: &str) -> Conversation {
        match self.chats.get(id) {
            Some(conversation) => {
                let conversation = conversation.clone();
                self.current = Some(conversation.id.clone());
                self.persist();
                conversation
            }
            None => self.create(),
        }
    }

    /// Append a turn to a conversation.
    ///
    /// No-op when the id is absent or the content carries no text — pure
    /// attachments are not persisted as standalone turns. Appending the
    /// second turn of a still-untitled conversation derives its title
    /// before the final persist.
    pub async fn append(&mut self, id: &str, content: Content, role: Role) {
        let Some(conversation) = self.chats.get_mut(id) else {
            return;
        };
        if !content.has_text() {
            return;
        }

        conversation.context.push(Message { role, content });
        let wants_title =
            conversation.context.len() >= 2 && conversation.chat_name == DEFAULT_CHAT_NAME;

        if wants_title {
            self.generate_title_for(id).await;
        }
        self.persist();
    }

    /// Derive a title for the current conversation from its first
    /// exchange. No-op with fewer than two turns or without a text-bearing
    /// first exchange; provider failure leaves the default name.
    pub async fn generate_title(&mut self) {
        let Some(id) = self.current.clone() else {
            return;
        };
        self.generate_title_for(&id).await;
    }

    async fn generate_title_for(&mut self, id: &str) {
        let Some(conversation) = self.chats.get(id) else {
            return;
        };
        if conversation.context.len() < 2 {
            return;
        }
        let Some(user_text) = conversation.first_user_text() else {
            return;
        };
        let Some(assistant_text) = conversation.first_assistant_text() else {
            return;
        };

        let probe = title::probe(&user_text, &assistant_text);
        match self.provider.complete(&probe).await {
            Ok(raw) => {
                let name = title::normalize(&raw);
                if let Some(conversation) = self.chats.get_mut(id) {
                    conversation.chat_name = name;
                }
                self.persist();
            }
            Err(e) => tracing::warn!("error generating chat name: {e}"),
        }
    }

    /// Overwrite a conversation's title. No-op when the id is absent.
    pub fn rename(&mut self, id: &str, name: &str) {
        if let Some(conversation) = self.chats.get_mut(id) {
            conversation.chat_name = name.to_owned();
            self.persist();
        }
    }

    /// The system prompt of a conversation, `""` when unset or absent.
    pub fn system_prompt(&self, id: &str) -> String {
        self.chats
            .get(id)
            .map(|c| c.system.clone())
            .unwrap_or_default()
    }

    /// Overwrite a conversation's system prompt. No-op when the id is
    /// absent.
    pub fn set_system_prompt(&mut self, id: &str, prompt: &str) {
        if let Some(conversation) = self.chats.get_mut(id) {
            conversation.system = prompt.to_owned();
            self.persist();
        }
    }

    /// Snapshot of all stored conversations. Unordered by contract — the
    /// presentation layer may sort.
    pub fn list(&self) -> Vec<Conversation> {
        self.chats.values().cloned().collect()
    }

    /// Delete a conversation, returning whether it existed.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.chats.remove(id).is_none() {
            return false;
        }
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        self.persist();
        true
    }

    /// The current conversation, if one is selected.
    pub fn current(&self) -> Option<&Conversation> {
        self.current.as_deref().and_then(|id| self.chats.get(id))
    }

    /// The storage backend (read access, for inspection in tests and
    /// diagnostics).
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The provider handle.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
