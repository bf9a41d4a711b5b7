use serde::{Deserialize, Deserializer, Serialize};

// ── Chat wire format ─────────────────────────────────────────────

/// Body of `POST /chat`: exactly the session key and the raw utterance.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub reply: String,
    #[serde(default, deserialize_with = "used_memory_flag")]
    pub used_memory: bool,
    #[serde(default)]
    pub turn: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The service reports `used_memory` either as a flag or as the list of
/// memories it recalled; an empty list or null means nothing was used.
fn used_memory_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(flag) => Ok(flag),
        serde_json::Value::Array(items) => Ok(!items.is_empty()),
        serde_json::Value::Null => Ok(false),
        other => Err(D::Error::custom(format!(
            "used_memory must be a boolean or a list, got {other}"
        ))),
    }
}

// ── Exchange outcome ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// No connection could be made, or it dropped mid-exchange.
    NetworkUnreachable,
    /// Reachable, answered with a non-2xx status.
    ServerError,
    /// No settled answer within the configured timeout.
    Timeout,
    /// Reachable and 2xx, but the body is not a valid reply.
    InvalidResponse,
}

impl FailureKind {
    /// Fixed apology appended to the conversation when an exchange fails.
    pub fn apology(self) -> &'static str {
        match self {
            Self::NetworkUnreachable => {
                "⚠️ Server connection failed. Is the memory service running?"
            }
            Self::ServerError => {
                "⚠️ The server ran into an error while answering. Please try again."
            }
            Self::Timeout => "⚠️ The server took too long to answer. Please try again.",
            Self::InvalidResponse => {
                "⚠️ The server replied, but something went wrong reading the answer."
            }
        }
    }
}

/// Result of exactly one round trip to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeResult {
    Success { reply: String, used_memory: bool },
    Failure { kind: FailureKind },
}

impl ExchangeResult {
    pub fn failure(kind: FailureKind) -> Self {
        Self::Failure { kind }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// ── Service endpoints ────────────────────────────────────────────

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub modules_loaded: bool,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" || self.status == "alive"
    }
}

/// Body of `GET /session/{id}/memories`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryListing {
    pub session_id: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub memories: Vec<MemoryRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub meta: MemoryMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryMeta {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub source_turn: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MemoryRecord {
    /// One-line description for listings.
    pub fn summary(&self) -> String {
        let text = self.text.as_deref().unwrap_or("(no text)");
        match (&self.meta.kind, &self.meta.key) {
            (Some(kind), Some(key)) => format!("[{kind}/{key}] {text}"),
            (Some(kind), None) => format!("[{kind}] {text}"),
            (None, Some(key)) => format!("[{key}] {text}"),
            (None, None) => text.to_string(),
        }
    }
}
