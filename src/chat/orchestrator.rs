use super::context::ChatContext;
use crate::conversation::{ConversationStore, Message, Snapshot};
use crate::error::{ChatError, StorageError};
use crate::exchange::ExchangeResult;
use crate::identity::{AuthProfile, Identity, SessionResolver};
use tracing::{debug, info, trace, warn};

/// Lifecycle of one `send_message` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ExchangePhase {
    Idle,
    Validating,
    Dispatched,
    Settled,
}

impl ExchangePhase {
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Dispatched | Self::Idle)
                | (Self::Dispatched, Self::Settled)
        )
    }

    fn advance(&mut self, next: Self) {
        debug_assert!(
            self.can_advance_to(next),
            "illegal exchange transition {self} -> {next}"
        );
        trace!(from = %self, to = %next, "exchange phase");
        *self = next;
    }
}

/// Why a send was dropped without touching the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IgnoreReason {
    EmptyInput,
    NoActiveSession,
    /// Another exchange is still outstanding.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Ignored(IgnoreReason),
    Settled(ExchangeResult),
}

/// Lowers the composing flag when the dispatched exchange goes out of scope,
/// whether it settled, panicked, or its future was dropped.
struct ComposingGuard<'a> {
    conversation: &'a ConversationStore,
}

impl Drop for ComposingGuard<'_> {
    fn drop(&mut self) {
        self.conversation.set_composing(false);
    }
}

/// Drives a message exchange from user input to a settled conversation entry.
pub struct Orchestrator {
    ctx: ChatContext,
    resolver: SessionResolver,
}

impl Orchestrator {
    pub fn new(ctx: ChatContext) -> Self {
        let resolver = SessionResolver::new(ctx.identity.clone());
        Self { ctx, resolver }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.ctx.identity.load()
    }

    pub fn session_id(&self) -> Option<String> {
        self.resolver.current_session_id(self.identity().as_ref())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.ctx.conversation.snapshot()
    }

    /// Send one utterance and settle its answer into the conversation.
    ///
    /// Blank input, a missing session and an exchange already in flight are
    /// silent no-ops. Every dispatched send ends with exactly one assistant
    /// entry, a reply or an apology, and the composing flag lowered.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let mut phase = ExchangePhase::Idle;
        phase.advance(ExchangePhase::Validating);

        if text.trim().is_empty() {
            phase.advance(ExchangePhase::Idle);
            return SendOutcome::Ignored(IgnoreReason::EmptyInput);
        }

        let Some(session_id) = self.session_id() else {
            debug!("send ignored: no active session");
            phase.advance(ExchangePhase::Idle);
            return SendOutcome::Ignored(IgnoreReason::NoActiveSession);
        };

        let conversation = self.ctx.conversation.as_ref();
        if !conversation.try_begin_exchange(Message::user(text)) {
            debug!("send ignored: exchange already in flight");
            phase.advance(ExchangePhase::Idle);
            return SendOutcome::Ignored(IgnoreReason::Busy);
        }
        let _composing = ComposingGuard { conversation };
        phase.advance(ExchangePhase::Dispatched);

        let result = self.ctx.exchange.exchange(&session_id, text).await;

        match &result {
            ExchangeResult::Success { reply, used_memory } => {
                info!(used_memory, "exchange settled");
                conversation.append(Message::assistant(reply.clone(), *used_memory));
            }
            ExchangeResult::Failure { kind } => {
                warn!(%kind, "exchange failed, appending apology");
                conversation.append(Message::assistant(kind.apology(), false));
            }
        }
        phase.advance(ExchangePhase::Settled);

        SendOutcome::Settled(result)
    }

    pub fn clear_conversation(&self) {
        self.ctx.conversation.clear();
    }

    /// Forget the signed-in identity and the visible conversation together.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.ctx.conversation.clear();
        self.ctx.identity.clear()
    }

    /// Adopt the profile handed over by the external sign-in flow.
    pub fn login(&self, profile: AuthProfile) -> Result<Identity, ChatError> {
        let identity = Identity::from(profile);
        if identity.id().is_empty() {
            return Err(anyhow::anyhow!("sign-in profile has no stable id").into());
        }
        self.switch_identity(&identity)?;
        Ok(identity)
    }

    /// Use the device's anonymous id as the session, creating it if needed.
    pub fn start_anonymous(&self) -> Result<Identity, StorageError> {
        let id = self.ctx.identity.get_or_create_anonymous_id()?;
        let identity = Identity::anonymous(id);
        self.switch_identity(&identity)?;
        Ok(identity)
    }

    /// Drop the device's anonymous id. An anonymous identity built on it is
    /// signed out as well; an authenticated one is left alone.
    pub fn forget_device(&self) -> Result<(), StorageError> {
        if self
            .identity()
            .is_some_and(|identity| !identity.is_authenticated())
        {
            self.logout()?;
        }
        self.ctx.identity.clear_anonymous_id()
    }

    /// Persist `identity`; a different session id starts an empty
    /// conversation since the service now recalls a different partition.
    fn switch_identity(&self, identity: &Identity) -> Result<(), StorageError> {
        let before = self.session_id();
        self.ctx.identity.save(identity)?;
        let after = self.session_id();
        if before != after {
            debug!("session changed, clearing conversation");
            self.ctx.conversation.clear();
        }
        Ok(())
    }
}
