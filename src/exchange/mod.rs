pub mod client;
pub mod http_client;
pub mod scrub;
pub mod types;

pub use client::{ExchangeClient, HttpExchangeClient};
pub use types::{ExchangeResult, FailureKind, HealthStatus, MemoryListing, MemoryRecord};
