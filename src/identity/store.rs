use super::Identity;
use super::kv::KeyValueStore;
use crate::error::StorageError;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const IDENTITY_KEY: &str = "user";
const ANONYMOUS_ID_KEY: &str = "memory_session_id";

/// Persists the active identity and the device-scoped anonymous id.
///
/// Both entries are opaque to the network protocol; only the session
/// resolver reads them.
#[derive(Clone)]
pub struct IdentityStore {
    kv: Arc<dyn KeyValueStore>,
}

impl IdentityStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// The persisted identity, or `None` on first run, after a clear, or when
    /// the stored record cannot be parsed.
    pub fn load(&self) -> Option<Identity> {
        let raw = self.kv.get(IDENTITY_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(error = %e, "stored identity is malformed, treating as signed out");
                None
            }
        }
    }

    pub fn save(&self, identity: &Identity) -> Result<(), StorageError> {
        let json = serde_json::to_string(identity).map_err(|source| StorageError::Encode {
            key: IDENTITY_KEY.to_string(),
            source,
        })?;
        self.kv.set(IDENTITY_KEY, &json)?;
        info!(
            kind = if identity.is_authenticated() { "authenticated" } else { "anonymous" },
            "identity saved"
        );
        Ok(())
    }

    /// Remove the identity record. The anonymous device id is kept.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(IDENTITY_KEY)?;
        info!("identity cleared");
        Ok(())
    }

    pub fn anonymous_id(&self) -> Option<String> {
        self.kv
            .get(ANONYMOUS_ID_KEY)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    /// The device's anonymous id, generating and persisting a fresh UUIDv4 the
    /// first time it is asked for.
    pub fn get_or_create_anonymous_id(&self) -> Result<String, StorageError> {
        if let Some(id) = self.anonymous_id() {
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        self.kv.set(ANONYMOUS_ID_KEY, &id)?;
        debug!(anonymous_id = %id, "generated anonymous device id");
        Ok(id)
    }

    pub fn clear_anonymous_id(&self) -> Result<(), StorageError> {
        self.kv.remove(ANONYMOUS_ID_KEY)
    }
}
