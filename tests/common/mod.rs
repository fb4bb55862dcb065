//! Common test utilities for integration tests
//!
//! Shared fixtures for building stores against in-memory and on-disk
//! databases.

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;
use trakt_token_store::adapters::sqlite::create_migrated_test_pool;
use trakt_token_store::{CredentialStore, DatabaseConfig, SqliteCredentialRepository};

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create a temporary test database path
///
/// Returns the path to a SQLite database file in a temporary directory.
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let db_path = dir.path().join("trakt_tokens.db");
    (dir, db_path)
}

/// Store backed by a private in-memory database.
pub async fn setup_store() -> CredentialStore {
    let pool = create_migrated_test_pool()
        .await
        .expect("failed to create test pool");
    CredentialStore::with_repository(SqliteCredentialRepository::new(pool))
}

/// Store backed by a database file inside a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn setup_file_store() -> (TempDir, PathBuf, CredentialStore) {
    let (dir, db_path) = temp_db_path();
    let store = CredentialStore::initialize(&DatabaseConfig::at_path(db_path.display().to_string()))
        .await
        .expect("failed to initialize store");
    (dir, db_path, store)
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Count rows in the tokens table.
pub async fn count_tokens(store: &CredentialStore) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tokens")
        .fetch_one(store.repository().pool())
        .await
        .expect("failed to count tokens");
    count
}
