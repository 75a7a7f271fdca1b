use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lastro_types::{ChatMessage, MessageId, MessageInput};

use crate::session::{ChatSession, PendingMessage};

/// Shared handle to one search session
///
/// Cloning is cheap and every clone sees the same log. The lock is only held
/// for the duration of a single operation, never across an await.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<ChatSession>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChatSession::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatSession> {
        // Session operations cannot leave the log half-updated, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read-only closure against the session
    pub fn read<R>(&self, f: impl FnOnce(&ChatSession) -> R) -> R {
        f(&self.lock())
    }

    /// Snapshot of the log, oldest first
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn add_message(&self, input: MessageInput) -> MessageId {
        self.lock().add_message(input)
    }

    /// Append and return a copy of the stored message
    pub fn push(&self, input: MessageInput) -> ChatMessage {
        let mut session = self.lock();
        let pending = session.reserve();
        session.complete_message(pending, input).clone()
    }

    pub fn reserve(&self) -> PendingMessage {
        self.lock().reserve()
    }

    pub fn complete(&self, pending: PendingMessage, input: MessageInput) -> ChatMessage {
        self.lock().complete_message(pending, input).clone()
    }

    pub fn clear_messages(&self) {
        self.lock().clear_messages();
    }

    pub fn recent_prompts(&self, n: usize) -> Vec<String> {
        self.lock().recent_prompts(n)
    }

    pub fn recent_queries(&self, n: usize) -> Vec<String> {
        self.lock().recent_queries(n)
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    /// Mark a request as in flight until the returned guard is dropped
    pub fn start_loading(&self) -> LoadingGuard {
        self.lock().begin_request();
        LoadingGuard {
            session: self.clone(),
        }
    }
}

/// Keeps the session in its loading state while alive
///
/// Dropping it ends the request on every exit path: success, failure, an
/// early return or a cancelled future.
#[derive(Debug)]
#[must_use = "loading ends as soon as the guard is dropped"]
pub struct LoadingGuard {
    session: SessionHandle,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.session.lock().end_request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_log() {
        let handle = SessionHandle::new();
        let other = handle.clone();

        handle.add_message(MessageInput::new("fado"));
        assert_eq!(other.len(), 1);
        assert_eq!(other.recent_prompts(1), vec!["fado"]);
    }

    #[test]
    fn test_loading_guard_clears_on_drop() {
        let handle = SessionHandle::new();
        {
            let _first = handle.start_loading();
            let second = handle.start_loading();
            assert!(handle.is_loading());
            drop(second);
            assert!(handle.is_loading());
        }
        assert!(!handle.is_loading());
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let handle = SessionHandle::new();
        handle.add_message(MessageInput::new("antes"));

        let poisoner = handle.clone();
        let result = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison the session lock");
        })
        .join();
        assert!(result.is_err());

        handle.add_message(MessageInput::new("depois"));
        assert_eq!(handle.recent_prompts(2), vec!["antes", "depois"]);
    }
}
