//! Credential store: the entry point callers use to persist and read Trakt
//! tokens.
//!
//! The store is an explicit object built once by [`CredentialStore::initialize`]
//! and cloned into whatever needs it. Every operation logs its outcome; write
//! and read failures are also returned so callers can react.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, error, info, warn};

use crate::adapters::sqlite::{self, DatabaseError, SqliteCredentialRepository};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Config, CredentialRecord, DatabaseConfig, TokenGrant};
use crate::domain::ports::CredentialRepository;

/// Outcome of [`CredentialStore::fetch`].
#[derive(Debug)]
pub enum Lookup {
    /// A record exists for the username.
    Found(CredentialRecord),
    /// No record was ever written for the username.
    NotFound,
    /// The storage engine failed; nothing is known about the record.
    Failed(DomainError),
}

impl Lookup {
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The record, if any. Not-found and failure both map to `None`.
    pub fn into_record(self) -> Option<CredentialRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound | Self::Failed(_) => None,
        }
    }

    /// Back into the repository's shape: errors propagate, absence is `None`.
    pub fn into_result(self) -> DomainResult<Option<CredentialRecord>> {
        match self {
            Self::Found(record) => Ok(Some(record)),
            Self::NotFound => Ok(None),
            Self::Failed(err) => Err(err),
        }
    }
}

impl From<DomainResult<Option<CredentialRecord>>> for Lookup {
    fn from(result: DomainResult<Option<CredentialRecord>>) -> Self {
        match result {
            Ok(Some(record)) => Self::Found(record),
            Ok(None) => Self::NotFound,
            Err(err) => Self::Failed(err),
        }
    }
}

pub struct CredentialStore<R: CredentialRepository = SqliteCredentialRepository> {
    repository: Arc<R>,
}

impl<R: CredentialRepository> Clone for CredentialStore<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl CredentialStore<SqliteCredentialRepository> {
    /// Open (or create) the database, apply the schema and return a ready
    /// store.
    ///
    /// An error here means the store cannot be used at all; it is logged
    /// before being returned and the caller is expected to abort startup.
    pub async fn initialize(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        match sqlite::initialize_from_config(config).await {
            Ok(pool) => {
                info!(path = %config.path, "Database initialized successfully");
                Ok(Self::with_repository(SqliteCredentialRepository::new(pool)))
            }
            Err(err) => {
                error!(path = %config.path, error = %err, "Failed to initialize database");
                Err(err)
            }
        }
    }

    /// Initialize against the default database location.
    pub async fn initialize_default() -> Result<Self, DatabaseError> {
        Self::initialize(&DatabaseConfig::default()).await
    }

    pub async fn from_config(config: &Config) -> Result<Self, DatabaseError> {
        Self::initialize(&config.database).await
    }

    /// Close the underlying pool. Calls made afterwards fail.
    pub async fn close(&self) {
        self.repository.pool().close().await;
    }
}

impl<R: CredentialRepository> CredentialStore<R> {
    pub fn with_repository(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Store tokens for `username`, replacing any tokens already stored.
    ///
    /// The access token expires `expires_in_seconds` after this call.
    pub async fn upsert(
        &self,
        username: &str,
        access_token: &str,
        refresh_token: &str,
        expires_in_seconds: u64,
    ) -> DomainResult<CredentialRecord> {
        let grant = TokenGrant::new(username, access_token, refresh_token, expires_in_seconds);
        self.upsert_grant(&grant).await
    }

    pub async fn upsert_grant(&self, grant: &TokenGrant) -> DomainResult<CredentialRecord> {
        let result = self.write(grant).await;

        match &result {
            Ok(record) => info!(
                username = %grant.username,
                expires_at = record.expires_at,
                "Tokens stored successfully for user"
            ),
            Err(err) => error!(
                username = %grant.username,
                error = %err,
                "Failed to store tokens for user"
            ),
        }

        result
    }

    async fn write(&self, grant: &TokenGrant) -> DomainResult<CredentialRecord> {
        grant.validate().map_err(DomainError::ValidationFailed)?;
        self.repository.upsert(grant, write_timestamp()).await
    }

    /// Look up the tokens stored for `username`.
    pub async fn fetch(&self, username: &str) -> Lookup {
        let lookup = Lookup::from(self.repository.get(username).await);

        match &lookup {
            Lookup::Found(_) => debug!(username, "Tokens retrieved for user"),
            Lookup::NotFound => warn!(username, "No tokens found for user"),
            Lookup::Failed(err) => error!(username, error = %err, "Failed to retrieve tokens for user"),
        }

        lookup
    }
}

/// Wall-clock time truncated to the precision the database keeps.
fn write_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
