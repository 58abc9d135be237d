// Allow dead code: collaborator boundary consumed by the chat UI layer
#![allow(dead_code)]

//! Boundary to the hosted messaging backend.
//!
//! The realtime backend is an external collaborator: quotewheel only
//! relies on `load_messages` / `save_message` and a new-message
//! notification channel. `LocalMessageStore` keeps a deduplicated local
//! mirror of everything seen, so the chat panel has content while
//! offline and replayed backend notifications are ignored.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::Message;

/// Capacity of the new-message broadcast channel.
/// Slow subscribers lag rather than block the sync path.
const NEW_MESSAGE_CHANNEL_CAPACITY: usize = 64;

/// What the messaging collaborator exposes. Implementations wrap a hosted
/// backend; tests and offline operation use `LocalMessageStore` directly.
#[allow(async_fn_in_trait)]
pub trait MessageBackend {
    async fn load_messages(&self) -> Result<Vec<Message>>;
    async fn save_message(&self, message: &Message) -> Result<()>;
}

/// Local JSON-file mirror of the message history.
pub struct LocalMessageStore {
    path: PathBuf,
    notify: broadcast::Sender<Message>,
}

impl LocalMessageStore {
    pub fn new(path: PathBuf) -> Self {
        let (notify, _) = broadcast::channel(NEW_MESSAGE_CHANNEL_CAPACITY);
        Self { path, notify }
    }

    /// Subscribe to messages newly recorded by `record`.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.notify.subscribe()
    }

    /// Record a message unless its id was already seen. Newly recorded
    /// messages are broadcast to subscribers. Returns whether it was new.
    pub fn record(&self, message: &Message) -> Result<bool> {
        let mut messages = self.read_all()?;
        if messages.iter().any(|m| m.id == message.id) {
            debug!(id = %message.id, "Duplicate message ignored");
            return Ok(false);
        }

        messages.push(message.clone());
        messages.sort_by_key(|m| m.timestamp);
        self.write_all(&messages)?;

        // No subscribers is fine; the send result is irrelevant then
        let _ = self.notify.send(message.clone());
        Ok(true)
    }

    /// All recorded messages, oldest first.
    pub fn messages(&self) -> Result<Vec<Message>> {
        self.read_all()
    }

    fn read_all(&self) -> Result<Vec<Message>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read message store: {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse message store: {}", self.path.display()))
    }

    fn write_all(&self, messages: &[Message]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(messages)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write message store: {}", self.path.display()))
    }
}

impl MessageBackend for LocalMessageStore {
    async fn load_messages(&self) -> Result<Vec<Message>> {
        self.messages()
    }

    async fn save_message(&self, message: &Message) -> Result<()> {
        self.record(message)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
