use super::types::{Message, Snapshot};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    messages: Vec<Message>,
    composing: bool,
}

/// Ordered, append-only message log plus the "assistant is composing" flag.
///
/// Both live behind one lock so a snapshot can never observe a half-applied
/// update. Poisoning is ignored: every mutation leaves the state valid, so a
/// panic elsewhere must not wedge the composing flag.
#[derive(Debug, Default)]
pub struct ConversationStore {
    state: Mutex<State>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, message: Message) {
        self.lock().messages.push(message);
    }

    pub fn clear(&self) {
        self.lock().messages.clear();
    }

    pub fn set_composing(&self, composing: bool) {
        self.lock().composing = composing;
    }

    pub fn is_composing(&self) -> bool {
        self.lock().composing
    }

    /// Single-flight gate: if no exchange is in flight, append the optimistic
    /// user message and raise the composing flag in one step. Returns `false`
    /// and changes nothing when an exchange is already outstanding.
    pub fn try_begin_exchange(&self, user_message: Message) -> bool {
        let mut state = self.lock();
        if state.composing {
            return false;
        }
        state.messages.push(user_message);
        state.composing = true;
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            messages: state.messages.clone(),
            composing: state.composing,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
