use super::Identity;
use super::store::IdentityStore;
use tracing::warn;

/// Outcome of deciding which key, if any, partitions the user's memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Session(String),
    /// Anonymous identity without a usable id; the device id must be used.
    NeedsAnonymousId,
    NoSession,
}

/// Pure session-key rule.
///
/// Authenticated subjects are used verbatim so memory follows the account
/// across devices. A blank subject yields no session rather than an empty key,
/// which the service would share between every such user.
pub fn resolve(identity: Option<&Identity>) -> Resolution {
    match identity {
        None => Resolution::NoSession,
        Some(Identity::Authenticated { id, .. }) => {
            if id.trim().is_empty() {
                Resolution::NoSession
            } else {
                Resolution::Session(id.clone())
            }
        }
        Some(Identity::Anonymous { id }) => {
            if id.trim().is_empty() {
                Resolution::NeedsAnonymousId
            } else {
                Resolution::Session(id.clone())
            }
        }
    }
}

/// Derives the session id from an identity, creating the anonymous device id
/// lazily when needed.
#[derive(Clone)]
pub struct SessionResolver {
    store: IdentityStore,
}

impl SessionResolver {
    pub fn new(store: IdentityStore) -> Self {
        Self { store }
    }

    pub fn current_session_id(&self, identity: Option<&Identity>) -> Option<String> {
        match resolve(identity) {
            Resolution::Session(id) => Some(id),
            Resolution::NoSession => None,
            Resolution::NeedsAnonymousId => match self.store.get_or_create_anonymous_id() {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "could not persist anonymous id, no session");
                    None
                }
            },
        }
    }
}
