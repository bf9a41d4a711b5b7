use crate::config::Config;
use crate::conversation::ConversationStore;
use crate::exchange::{ExchangeClient, HttpExchangeClient};
use crate::identity::{FileKeyValueStore, IdentityStore};
use std::sync::Arc;

/// Everything the orchestrator works with, constructed once and handed in.
#[derive(Clone)]
pub struct ChatContext {
    pub identity: IdentityStore,
    pub conversation: Arc<ConversationStore>,
    pub exchange: Arc<dyn ExchangeClient>,
}

impl ChatContext {
    pub fn new(
        identity: IdentityStore,
        conversation: Arc<ConversationStore>,
        exchange: Arc<dyn ExchangeClient>,
    ) -> Self {
        Self {
            identity,
            conversation,
            exchange,
        }
    }

    /// File-backed identity, empty conversation and the HTTP service client.
    pub fn from_config(config: &Config) -> Self {
        let kv = FileKeyValueStore::open(&config.storage.resolved_data_dir());
        Self::new(
            IdentityStore::new(Arc::new(kv)),
            Arc::new(ConversationStore::new()),
            Arc::new(HttpExchangeClient::new(&config.api)),
        )
    }
}
