pub mod config;
pub mod credential;

pub use config::{Config, DatabaseConfig, LoggingConfig};
pub use credential::{CredentialRecord, TokenGrant};
