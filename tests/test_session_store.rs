//! Integration tests for the session store.
//!
//! Tests cover:
//! - Signing in and restoring the session after a restart
//! - Signing out
//! - Unreadable session records
//! - The stored JSON shape

mod common;

use common::*;

#[tokio::test]
async fn test_fresh_store_has_no_session() -> anyhow::Result<()> {
    let mut sessions = SessionStore::new(MemoryDb::new());
    assert_eq!(sessions.init().await?, None);
    assert!(!sessions.is_signed_in());
    assert!(sessions.current().is_none());
    Ok(())
}

#[tokio::test]
async fn test_session_survives_restart() -> anyhow::Result<()> {
    // 1. Sign in against an on-disk database
    let (db, dir) = create_test_db().await;
    let identity = demo_identity("mock-order-1");
    let mut sessions = SessionStore::new(db.clone());
    sessions.init().await?;
    sessions.sign_in(identity.clone()).await?;
    assert_eq!(sessions.current(), Some(&identity));
    db.close().await?;

    // 2. Reopen the same file and restore
    let reopened = PortalDb::open(dir.path().join("portal.db")).await?;
    let mut restored = SessionStore::new(reopened.clone());
    assert_eq!(restored.init().await?, Some(identity.clone()));
    assert!(restored.is_signed_in());
    reopened.close().await?;

    Ok(())
}

#[tokio::test]
async fn test_sign_out_clears_stored_session() -> anyhow::Result<()> {
    // 1. Sign in then out
    let store = MemoryDb::new();
    let mut sessions = SessionStore::new(store.clone());
    sessions.sign_in(demo_identity("mock-order-2")).await?;
    assert_eq!(store.len(), 1);

    sessions.sign_out().await?;
    assert!(!sessions.is_signed_in());

    // 2. The key is gone, so a restart comes back signed out
    assert_eq!(store.load(SESSION_KEY).await?, None);
    let mut restarted = SessionStore::new(store);
    assert_eq!(restarted.init().await?, None);

    Ok(())
}

#[tokio::test]
async fn test_sign_out_without_session_is_harmless() -> anyhow::Result<()> {
    let mut sessions = SessionStore::new(MemoryDb::new());
    sessions.sign_out().await?;
    assert!(!sessions.is_signed_in());
    Ok(())
}

#[tokio::test]
async fn test_unreadable_session_is_discarded() -> anyhow::Result<()> {
    // 1. Corrupt blob under the session key
    let store = MemoryDb::new();
    store.store(SESSION_KEY, "{not json").await?;

    // 2. Init treats it as signed out and removes it
    let mut sessions = SessionStore::new(store.clone());
    assert_eq!(sessions.init().await?, None);
    assert_eq!(store.load(SESSION_KEY).await?, None);
    assert!(store.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_session_blob_uses_camel_case_keys() -> anyhow::Result<()> {
    let store = MemoryDb::new();
    let mut sessions = SessionStore::new(store.clone());
    sessions.sign_in(demo_identity("mock-order-3")).await?;

    let blob = store.load(SESSION_KEY).await?.expect("session stored");
    let value: serde_json::Value = serde_json::from_str(&blob)?;
    assert_eq!(value["personalNumber"], "198001011234");
    assert_eq!(value["name"], "Demo User");
    assert_eq!(value["orderRef"], "mock-order-3");

    Ok(())
}

#[tokio::test]
async fn test_sign_in_replaces_previous_identity() -> anyhow::Result<()> {
    let store = MemoryDb::new();
    let mut sessions = SessionStore::new(store.clone());
    sessions.sign_in(demo_identity("mock-order-4")).await?;
    sessions.sign_in(demo_identity("mock-order-5")).await?;

    let mut restarted = SessionStore::new(store);
    let restored = restarted.init().await?.expect("session restored");
    assert_eq!(restored.order_ref, "mock-order-5");

    Ok(())
}
