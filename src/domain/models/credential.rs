//! Credential domain model.
//!
//! A credential record is the access/refresh token pair issued to one
//! Trakt user, plus the instant the access token stops being valid.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::errors::{DomainError, DomainResult};

/// Stored credentials for a single username.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Natural key, case-sensitive
    pub username: String,
    /// Opaque bearer credential
    pub access_token: String,
    /// Opaque credential used to mint new access tokens
    pub refresh_token: String,
    /// Epoch milliseconds after which `access_token` is invalid
    pub expires_at: i64,
    /// When the record was first inserted
    pub created_at: DateTime<Utc>,
    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Whether the access token is expired at `now_ms` (epoch milliseconds).
    pub const fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }

    /// True when the token is expired or will be within `window`.
    ///
    /// Callers use this to refresh ahead of expiry.
    pub fn expires_within(&self, window: Duration) -> bool {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        Utc::now()
            .timestamp_millis()
            .saturating_add(window_ms)
            >= self.expires_at
    }

    /// `expires_at` as a timestamp, if it is representable.
    pub fn expires_at_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.expires_at).single()
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("username", &self.username)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A freshly issued token pair to be written for a user.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token, counted from the moment of the write
    pub expires_in_seconds: u64,
}

impl TokenGrant {
    pub fn new(
        username: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in_seconds: u64,
    ) -> Self {
        Self {
            username: username.into(),
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in_seconds,
        }
    }

    /// Validate that every field carries a value.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.is_empty() {
            return Err("username cannot be empty".to_string());
        }
        if self.access_token.is_empty() {
            return Err("access token cannot be empty".to_string());
        }
        if self.refresh_token.is_empty() {
            return Err("refresh token cannot be empty".to_string());
        }
        Ok(())
    }

    /// Absolute expiry in epoch milliseconds for a write happening at `now_ms`.
    pub fn expires_at(&self, now_ms: i64) -> DomainResult<i64> {
        i64::try_from(self.expires_in_seconds)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(|ms| now_ms.checked_add(ms))
            .ok_or_else(|| {
                DomainError::ValidationFailed(format!(
                    "expires_in of {} seconds overflows the expiry timestamp",
                    self.expires_in_seconds
                ))
            })
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("username", &self.username)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in_seconds", &self.expires_in_seconds)
            .finish()
    }
}
