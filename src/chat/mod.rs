pub mod context;
pub mod orchestrator;

pub use context::ChatContext;
pub use orchestrator::{ExchangePhase, IgnoreReason, Orchestrator, SendOutcome};
