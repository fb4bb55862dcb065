//! SQLite implementation of the CredentialRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CredentialRecord, TokenGrant};
use crate::domain::ports::CredentialRepository;

use super::{format_datetime, parse_datetime};

#[derive(Clone)]
pub struct SqliteCredentialRepository {
    pool: SqlitePool,
}

impl SqliteCredentialRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CredentialRepository for SqliteCredentialRepository {
    async fn upsert(&self, grant: &TokenGrant, now: DateTime<Utc>) -> DomainResult<CredentialRecord> {
        let expires_at = grant.expires_at(now.timestamp_millis())?;
        let stamp = format_datetime(now);

        // Commit only once the stored row decodes, so an Err means nothing
        // was written.
        let mut tx = self.pool.begin().await?;

        // One statement, so concurrent writers to the same username serialize
        // on the row as a whole. updated_at never moves backwards.
        let row: CredentialRow = sqlx::query_as(
            r#"INSERT INTO tokens (trakt_username, access_token, refresh_token, expires_at, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(trakt_username) DO UPDATE SET
                 access_token = excluded.access_token,
                 refresh_token = excluded.refresh_token,
                 expires_at = excluded.expires_at,
                 updated_at = MAX(COALESCE(tokens.updated_at, ''), excluded.updated_at)
               RETURNING trakt_username, access_token, refresh_token, expires_at, created_at, updated_at"#
        )
        .bind(&grant.username)
        .bind(&grant.access_token)
        .bind(&grant.refresh_token)
        .bind(expires_at)
        .bind(&stamp)
        .bind(&stamp)
        .fetch_one(&mut *tx)
        .await?;

        let record = CredentialRecord::try_from(row)?;
        tx.commit().await?;
        Ok(record)
    }

    async fn get(&self, username: &str) -> DomainResult<Option<CredentialRecord>> {
        let row: Option<CredentialRow> = sqlx::query_as(
            r#"SELECT trakt_username, access_token, refresh_token, expires_at, created_at, updated_at
               FROM tokens WHERE trakt_username = ?"#
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_into()).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    trakt_username: String,
    access_token: String,
    refresh_token: String,
    expires_at: i64,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl TryFrom<CredentialRow> for CredentialRecord {
    type Error = DomainError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let created_at = row
            .created_at
            .as_deref()
            .map(parse_datetime)
            .transpose()?
            .ok_or_else(|| DomainError::SerializationError("missing created_at".to_string()))?;

        // A row without updated_at was never updated after creation.
        let updated_at = row
            .updated_at
            .as_deref()
            .map(parse_datetime)
            .transpose()?
            .unwrap_or(created_at);

        Ok(CredentialRecord {
            username: row.trakt_username,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            created_at,
            updated_at,
        })
    }
}
