mod common;

use std::time::Duration;

use chrono::Utc;
use common::{count_tokens, setup_file_store, setup_store, setup_test_logging, temp_dir};
use trakt_token_store::{
    CredentialStore, DatabaseConfig, DatabaseError, DomainError, Lookup, TokenGrant,
};

#[tokio::test]
async fn test_store_then_fetch_returns_tokens() {
    setup_test_logging();
    let store = setup_store().await;

    let before = Utc::now().timestamp_millis();
    store
        .upsert("alice", "AT1", "RT1", 3600)
        .await
        .expect("upsert failed");
    let after = Utc::now().timestamp_millis();

    let record = store
        .fetch("alice")
        .await
        .into_record()
        .expect("record should exist");

    assert_eq!(record.username, "alice");
    assert_eq!(record.access_token, "AT1");
    assert_eq!(record.refresh_token, "RT1");
    assert!(record.expires_at >= before + 3_600_000);
    assert!(record.expires_at <= after + 3_600_000);
    assert_eq!(record.created_at, record.updated_at);
}

#[tokio::test]
async fn test_second_upsert_replaces_tokens_and_keeps_created_at() {
    let store = setup_store().await;

    let first = store.upsert("alice", "AT1", "RT1", 3600).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let before = Utc::now().timestamp_millis();
    store.upsert("alice", "AT2", "RT2", 7200).await.unwrap();

    let Lookup::Found(record) = store.fetch("alice").await else {
        panic!("record should exist");
    };

    assert_eq!(record.access_token, "AT2");
    assert_eq!(record.refresh_token, "RT2");
    assert!(record.expires_at >= before + 7_200_000);
    assert_eq!(record.created_at, first.created_at);
    assert!(record.updated_at > first.updated_at);
    assert_eq!(count_tokens(&store).await, 1);
}

#[tokio::test]
async fn test_fetch_unknown_user_is_not_found() {
    let store = setup_store().await;

    let lookup = store.fetch("nobody").await;

    assert!(lookup.is_not_found());
    assert!(!lookup.is_failed());
    assert!(matches!(lookup.into_result(), Ok(None)));
}

#[tokio::test]
async fn test_fetch_returns_what_upsert_returned() {
    let store = setup_store().await;

    let written = store
        .upsert_grant(&TokenGrant::new("bob", "access", "refresh", 60))
        .await
        .unwrap();
    let read = store.fetch("bob").await.into_record().unwrap();

    assert_eq!(written, read);
}

#[tokio::test]
async fn test_zero_expiry_is_immediately_expired() {
    let store = setup_store().await;

    let record = store.upsert("alice", "AT", "RT", 0).await.unwrap();

    assert!(record.is_expired_at(record.expires_at));
    assert!(record.expires_within(Duration::from_secs(1)));
}

#[tokio::test]
async fn test_each_username_has_its_own_record() {
    let store = setup_store().await;

    for user in ["alice", "bob", "carol"] {
        store.upsert(user, &format!("{user}-at"), &format!("{user}-rt"), 60).await.unwrap();
    }
    store.upsert("bob", "bob-at-2", "bob-rt-2", 60).await.unwrap();

    assert_eq!(count_tokens(&store).await, 3);
    assert_eq!(store.fetch("alice").await.into_record().unwrap().access_token, "alice-at");
    assert_eq!(store.fetch("bob").await.into_record().unwrap().access_token, "bob-at-2");
}

#[tokio::test]
async fn test_invalid_input_is_rejected_and_not_stored() {
    let store = setup_store().await;

    let result = store.upsert("alice", "", "RT", 60).await;
    assert!(matches!(result, Err(DomainError::ValidationFailed(_))));

    let result = store.upsert("", "AT", "RT", 60).await;
    assert!(matches!(result, Err(DomainError::ValidationFailed(_))));

    let result = store.upsert("alice", "AT", "RT", u64::MAX).await;
    assert!(matches!(result, Err(DomainError::ValidationFailed(_))));

    assert_eq!(count_tokens(&store).await, 0);
}

#[tokio::test]
async fn test_records_survive_reopening_the_database() {
    let (_dir, db_path, store) = setup_file_store().await;
    let original = store.upsert("alice", "AT1", "RT1", 3600).await.unwrap();
    store.close().await;

    let reopened = CredentialStore::initialize(&DatabaseConfig::at_path(db_path.display().to_string()))
        .await
        .expect("second initialize should succeed");

    let record = reopened.fetch("alice").await.into_record().expect("record should survive");
    assert_eq!(record, original);
}

#[tokio::test]
async fn test_initialize_fails_when_location_is_unusable() {
    let dir = temp_dir();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"occupied").unwrap();
    let db_path = blocker.join("trakt_tokens.db");

    let result = CredentialStore::initialize(&DatabaseConfig::at_path(db_path.display().to_string())).await;

    assert!(matches!(result, Err(DatabaseError::Connection(_))));
}

#[tokio::test]
async fn test_initialize_rejects_empty_pool() {
    let dir = temp_dir();
    let config = DatabaseConfig {
        max_connections: 0,
        ..DatabaseConfig::at_path(dir.path().join("trakt_tokens.db").display().to_string())
    };

    let result = CredentialStore::initialize(&config).await;

    assert!(matches!(result, Err(DatabaseError::InvalidConfig(_))));
    assert!(!dir.path().join("trakt_tokens.db").exists());
}

#[tokio::test]
async fn test_fetch_after_close_reports_failure() {
    let (_dir, _db_path, store) = setup_file_store().await;
    store.upsert("alice", "AT1", "RT1", 60).await.unwrap();
    store.close().await;

    let lookup = store.fetch("alice").await;
    assert!(lookup.is_failed());
    assert!(store.upsert("alice", "AT2", "RT2", 60).await.is_err());
}

#[tokio::test]
async fn test_concurrent_upserts_leave_one_complete_grant() {
    let (_dir, _db_path, store) = setup_file_store().await;

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .upsert("alice", &format!("AT{i}"), &format!("RT{i}"), 60 + i)
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("task panicked").expect("upsert failed");
    }

    let record = store.fetch("alice").await.into_record().unwrap();
    let at_suffix = record.access_token.trim_start_matches("AT");
    let rt_suffix = record.refresh_token.trim_start_matches("RT");
    assert_eq!(at_suffix, rt_suffix, "fields from different grants were mixed");
    assert_eq!(count_tokens(&store).await, 1);
}

#[tokio::test]
async fn test_legacy_database_is_upgraded() {
    let dir = temp_dir();
    let db_path = dir.path().join("trakt_tokens.db");
    let url = format!("sqlite:{}?mode=rwc", db_path.display());

    {
        let pool = sqlx::SqlitePool::connect(&url).await.unwrap();
        sqlx::query(
            "CREATE TABLE tokens (
                trakt_username TEXT PRIMARY KEY,
                access_token TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE TRIGGER update_tokens_updated_at
             AFTER UPDATE ON tokens
             FOR EACH ROW
             BEGIN
                UPDATE tokens SET updated_at = CURRENT_TIMESTAMP WHERE trakt_username = OLD.trakt_username;
             END",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO tokens (trakt_username, access_token, refresh_token, expires_at)
             VALUES ('legacy', 'old-at', 'old-rt', 1700000000000)",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;
    }

    let store = CredentialStore::initialize(&DatabaseConfig::at_path(db_path.display().to_string()))
        .await
        .expect("initialize should adopt the existing table");

    let old = store.fetch("legacy").await.into_record().expect("legacy row should be readable");
    assert_eq!(old.access_token, "old-at");

    let updated = store.upsert("legacy", "new-at", "new-rt", 60).await.unwrap();
    assert_eq!(updated.created_at, old.created_at);
    assert!(updated.updated_at >= old.updated_at);

    // The stored row matches what the write reported; nothing re-stamped it.
    let stored = store.fetch("legacy").await.into_record().unwrap();
    assert_eq!(stored, updated);
}
