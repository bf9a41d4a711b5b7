pub mod schema;

pub use schema::{ApiConfig, Config, LoggingConfig, StorageConfig};
