//! Per-chat exclusion for chat-session read-modify-write cycles.
//!
//! The dispatcher orders updates per chat, but completion replies are applied
//! from spawned tasks. Every load → mutate → store of a [`ChatSession`] runs
//! while holding the chat's slot so those cycles never interleave.
//!
//! [`ChatSession`]: crate::chat::ChatSession

use std::collections::HashMap;
use std::sync::Arc;

use teloxide::types::ChatId;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Bookkeeping that lives next to the dialogue state but outside storage.
#[derive(Debug, Default)]
pub struct ChatSlot {
    /// Token of the request whose task is still running, if any.
    pub pending_request: Option<Uuid>,
}

#[derive(Debug, Default)]
pub struct ChatLocks {
    slots: Mutex<HashMap<ChatId, Arc<Mutex<ChatSlot>>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the chat's slot.
    pub async fn lock(&self, chat_id: ChatId) -> OwnedMutexGuard<ChatSlot> {
        let slot = self.slots.lock().await.entry(chat_id).or_default().clone();
        slot.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn second_holder_waits_for_the_first() {
        let locks = Arc::new(ChatLocks::new());
        let mut guard = locks.lock(ChatId(7)).await;
        guard.pending_request = Some(Uuid::new_v4());

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.lock(ChatId(7)).await.pending_request.take() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        assert!(waiter.await.unwrap().is_some());
    }

    #[tokio::test]
    async fn chats_do_not_block_each_other() {
        let locks = ChatLocks::new();
        let _first = locks.lock(ChatId(1)).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock(ChatId(2))).await;
        assert!(second.is_ok());
    }
}
