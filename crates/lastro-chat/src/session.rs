use std::collections::VecDeque;

use log::{debug, warn};

use lastro_types::{ChatMessage, MessageId, MessageInput, MAX_MESSAGES};

/// Identity reserved for a message whose content is not known yet
///
/// Obtained from [`ChatSession::reserve`] when a request is issued and
/// consumed by [`ChatSession::complete`] once it resolves. Not `Clone`: one
/// reservation produces exactly one message.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingMessage {
    id: MessageId,
    generation: u64,
}

impl PendingMessage {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Bounded, ordered log of the exchanges of one search session
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: VecDeque<ChatMessage>,
    next_id: MessageId,
    /// Bumped by every clear, so reservations from before it can be told apart
    generation: u64,
    in_flight: usize,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::with_capacity(MAX_MESSAGES),
            ..Default::default()
        }
    }

    /// Messages in chronological (and display) order
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.back()
    }

    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Identity the next reservation will receive
    pub fn next_id(&self) -> MessageId {
        self.next_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Append a message right away and return its identity
    pub fn add_message(&mut self, input: MessageInput) -> MessageId {
        let pending = self.reserve();
        self.complete(pending, input)
    }

    /// Take the next identity without appending anything yet
    pub fn reserve(&mut self) -> PendingMessage {
        let pending = PendingMessage {
            id: self.next_id,
            generation: self.generation,
        };
        self.next_id += 1;
        pending
    }

    /// Append the message for an earlier reservation and return its identity
    pub fn complete(&mut self, pending: PendingMessage, input: MessageInput) -> MessageId {
        self.complete_message(pending, input).id
    }

    /// Like [`complete`](Self::complete), returning the appended message
    pub fn complete_message(&mut self, pending: PendingMessage, input: MessageInput) -> &ChatMessage {
        let id = if pending.generation == self.generation {
            pending.id
        } else {
            // Reserved before a clear: the old id may collide with the new session's ids
            let id = self.next_id;
            self.next_id += 1;
            warn!(
                "Message reserved as #{} before the session was cleared, recording it as #{}",
                pending.id, id
            );
            id
        };

        while self.messages.len() >= MAX_MESSAGES {
            if let Some(evicted) = self.messages.pop_front() {
                debug!("Evicting message #{} from session log", evicted.id);
            }
        }
        self.messages.push_back(input.into_message(id));

        let last = self.messages.len() - 1;
        &self.messages[last]
    }

    /// Empty the log and restart identities at 0
    pub fn clear_messages(&mut self) {
        debug!("Clearing session log ({} messages)", self.messages.len());
        self.messages.clear();
        self.next_id = 0;
        self.generation += 1;
    }

    /// Prompts of the last `n` messages, oldest first
    pub fn recent_prompts(&self, n: usize) -> Vec<String> {
        self.recent(n).map(|m| m.prompt.clone()).collect()
    }

    /// Primary queries of the last `n` messages, oldest first. Messages
    /// without queries contribute an empty string.
    pub fn recent_queries(&self, n: usize) -> Vec<String> {
        self.recent(n).map(|m| m.primary_query().to_string()).collect()
    }

    fn recent(&self, n: usize) -> impl Iterator<Item = &ChatMessage> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn begin_request(&mut self) {
        self.in_flight += 1;
    }

    pub fn end_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
