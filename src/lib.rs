//! Trakt token store
//!
//! Durable storage for the OAuth credentials (access token, refresh token,
//! expiry) issued to Trakt users, keyed by username and backed by SQLite.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): credential models, errors, storage port
//! - **Adapter Layer** (`adapters`): SQLite implementation of the port
//! - **Service Layer** (`services`): the `CredentialStore` callers use
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//!
//! # Example
//!
//! ```no_run
//! use trakt_token_store::{CredentialStore, DatabaseConfig, Lookup};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = CredentialStore::initialize(&DatabaseConfig::default()).await?;
//! store.upsert("alice", "access", "refresh", 7_776_000).await?;
//!
//! if let Lookup::Found(record) = store.fetch("alice").await {
//!     assert!(!record.is_expired());
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::sqlite::{DatabaseError, SqliteCredentialRepository};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, CredentialRecord, DatabaseConfig, LoggingConfig, TokenGrant};
pub use domain::ports::CredentialRepository;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::{LogConfig, LoggerImpl};
pub use services::{CredentialStore, Lookup};
