//! Credential repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{CredentialRecord, TokenGrant};

/// Repository interface for credential persistence.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Insert the grant, or overwrite the tokens and expiry of an existing
    /// record for the same username. `now` stamps the write.
    ///
    /// Must be atomic per username: concurrent callers never observe or leave
    /// a mix of fields from two grants.
    async fn upsert(&self, grant: &TokenGrant, now: DateTime<Utc>) -> DomainResult<CredentialRecord>;

    /// Get the record for a username.
    async fn get(&self, username: &str) -> DomainResult<Option<CredentialRecord>>;
}
