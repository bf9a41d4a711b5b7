//! Who is talking to the assistant.
//!
//! An [`Identity`] is either a device-scoped anonymous UUID or a subject id
//! handed over by an external sign-in flow. The active identity determines the
//! session id, and the session id is the partition key the service uses to
//! recall memories, so switching identity kind deliberately switches memory.

pub mod kv;
pub mod resolver;
pub mod store;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use resolver::{Resolution, SessionResolver, resolve};
pub use store::IdentityStore;

use serde::{Deserialize, Serialize};

/// The single active identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Identity {
    Anonymous {
        id: String,
    },
    Authenticated {
        id: String,
        display_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

impl Identity {
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self::Anonymous { id: id.into() }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Anonymous { id } | Self::Authenticated { id, .. } => id,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Name to show in a header; anonymous users get a fixed label.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Anonymous { .. } => "anonymous",
            Self::Authenticated { display_name, .. } => display_name,
        }
    }
}

/// Profile fields supplied by the external sign-in collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthProfile {
    pub stable_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

impl From<AuthProfile> for Identity {
    fn from(profile: AuthProfile) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.and_then(|v| {
                let trimmed = v.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
        }

        Self::Authenticated {
            id: profile.stable_id.trim().to_string(),
            display_name: profile.display_name.trim().to_string(),
            avatar_url: non_empty(profile.avatar_url),
            email: non_empty(profile.email),
        }
    }
}
