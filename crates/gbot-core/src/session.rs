//! Per-conversation session state.
//!
//! A conversation is one user inside one chat. The only state it can carry is
//! whether the next plain-text message should be read as a bulk group count.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{ChatId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub chat_id: ChatId,
    pub user_id: UserId,
}

impl ConversationKey {
    pub fn new(chat_id: ChatId, user_id: UserId) -> Self {
        Self { chat_id, user_id }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    WaitingForCount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// `/createbulk`
    BulkRequested,
    /// Text that did not parse to a count in range.
    InvalidCount,
    /// Text with a usable count; the bulk run has finished (or failed).
    CountConsumed,
}

impl ConversationState {
    /// Transition table. There is no timeout: `WaitingForCount` lasts until a
    /// usable count arrives or the process restarts.
    pub fn on_event(self, event: SessionEvent) -> ConversationState {
        match (self, event) {
            (_, SessionEvent::BulkRequested) => ConversationState::WaitingForCount,
            (ConversationState::WaitingForCount, SessionEvent::InvalidCount) => {
                ConversationState::WaitingForCount
            }
            (ConversationState::WaitingForCount, SessionEvent::CountConsumed) => {
                ConversationState::Idle
            }
            (ConversationState::Idle, _) => ConversationState::Idle,
        }
    }
}

/// Conversation states keyed by `(chat, user)`. Missing entries are `Idle`.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<ConversationKey, ConversationState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self, key: ConversationKey) -> ConversationState {
        self.inner
            .lock()
            .await
            .get(&key)
            .copied()
            .unwrap_or_default()
    }

    /// Apply `event` and return `(before, after)`.
    pub async fn apply(
        &self,
        key: ConversationKey,
        event: SessionEvent,
    ) -> (ConversationState, ConversationState) {
        let mut map = self.inner.lock().await;
        let before = map.get(&key).copied().unwrap_or_default();
        let after = before.on_event(event);
        if after == ConversationState::Idle {
            map.remove(&key);
        } else {
            map.insert(key, after);
        }
        (before, after)
    }
}

/// Serializes update handling per chat so a conversation's state is never
/// written by two handlers at once.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id.0)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
