use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry of the visible conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// Whether the service drew on stored memories for this reply.
    pub used_memory: bool,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            used_memory: false,
            sent_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>, used_memory: bool) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            used_memory,
            sent_at: Utc::now(),
        }
    }
}

/// A consistent view of the conversation for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub composing: bool,
}

impl Snapshot {
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
