/// UserService tests
/// State transitions of a single user record, against real and failing stores
mod common;

use common::fixtures::{TEST_PASSWORD, TEST_USERNAME};
use common::{create_test_store, FailOn, FailingStore};
use proptest::prelude::*;
use roster_server::services::{LoginDirection, UserError, UserService};
use roster_storage::MemoryUserStore;
use serde_json::{json, Value};
use std::sync::Arc;

fn candidate(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

#[tokio::test]
async fn test_lifecycle_against_sqlite() {
    let (store, _temp_dir) = create_test_store().await;
    let users = UserService::new(Arc::new(store));
    let alice = candidate(TEST_USERNAME, TEST_PASSWORD);

    // NonExistent -> Active(false)
    let created = users.create_user(Some(&alice)).await.unwrap();
    assert!(!created.is_logged_in);

    // Active(false) -> Active(true) -> Active(false)
    let toggle = users.toggle_login(Some(&alice)).await.unwrap();
    assert_eq!(toggle.direction, LoginDirection::In);
    let toggle = users.toggle_login(Some(&alice)).await.unwrap();
    assert_eq!(toggle.direction, LoginDirection::Out);
    assert!(!users.get_user(TEST_USERNAME).await.unwrap().is_logged_in);

    // Active -> NonExistent
    let deleted = users.delete_user(TEST_USERNAME, TEST_PASSWORD).await.unwrap();
    assert_eq!(
        Value::Object(deleted.into_document()),
        json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD })
    );
    assert!(matches!(
        users.get_user(TEST_USERNAME).await,
        Err(UserError::NotFound)
    ));
}

#[tokio::test]
async fn test_conflict_ignores_other_fields() {
    let users = UserService::new(Arc::new(MemoryUserStore::new()));
    users
        .create_user(Some(&candidate("alice", "pw1")))
        .await
        .unwrap();

    let different = json!({ "username": "alice", "password": "other", "team": "blue" });
    assert!(matches!(
        users.create_user(Some(&different)).await,
        Err(UserError::Conflict)
    ));
}

#[tokio::test]
async fn test_username_message_precedence() {
    let users = UserService::new(Arc::new(MemoryUserStore::new()));

    match users.create_user(Some(&json!({}))).await {
        Err(UserError::InvalidInput(msg)) => assert_eq!(msg, "null or empty username field"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_toggle_with_stale_login_flag_does_not_match() {
    let users = UserService::new(Arc::new(MemoryUserStore::new()));
    let alice = candidate("alice", "pw1");
    users.create_user(Some(&alice)).await.unwrap();

    let with_flag = json!({ "username": "alice", "password": "pw1", "isLoggedIn": false });
    users.toggle_login(Some(&with_flag)).await.unwrap();

    // Stored flag is now true, so the same candidate no longer matches
    assert!(matches!(
        users.toggle_login(Some(&with_flag)).await,
        Err(UserError::NotFound)
    ));
}

#[tokio::test]
async fn test_delete_with_wrong_password() {
    let users = UserService::new(Arc::new(MemoryUserStore::new()));
    users
        .create_user(Some(&candidate("alice", "pw1")))
        .await
        .unwrap();

    assert!(matches!(
        users.delete_user("alice", "pw2").await,
        Err(UserError::NotFound)
    ));
    assert!(users.get_user("alice").await.is_ok());
}

#[tokio::test]
async fn test_sessions_closed_after_store_failures() {
    for fail_on in [FailOn::Find, FailOn::Insert, FailOn::Update, FailOn::Delete] {
        let memory = MemoryUserStore::new();
        UserService::new(Arc::new(memory.clone()))
            .create_user(Some(&candidate("alice", "pw1")))
            .await
            .unwrap();

        let store = FailingStore::new(memory.clone(), fail_on);
        let users = UserService::new(Arc::new(store.clone()));

        let results = [
            users.get_user("alice").await.err(),
            users
                .create_user(Some(&candidate("bob", "pw")))
                .await
                .err(),
            users
                .toggle_login(Some(&candidate("alice", "pw1")))
                .await
                .err(),
            users.delete_user("alice", "pw1").await.err(),
        ];

        assert!(
            results.iter().any(|r| matches!(r, Some(UserError::Store(_)))),
            "{fail_on:?} should surface a store error"
        );
        assert_eq!(store.closed_sessions(), 4, "{fail_on:?}");
        assert_eq!(memory.live_sessions(), 0, "{fail_on:?}");
    }
}

#[tokio::test]
async fn test_connection_failure() {
    let store = FailingStore::new(MemoryUserStore::new(), FailOn::Connect);
    let users = UserService::new(Arc::new(store));

    assert!(matches!(
        users.get_user("alice").await,
        Err(UserError::Connection(_))
    ));
}

proptest! {
    /// Property: any valid pair reads back logged out after creation
    #[test]
    fn created_users_read_back_logged_out(
        username in "[a-zA-Z0-9_]{1,24}",
        password in "[ -~]{1,32}",
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let users = UserService::new(Arc::new(MemoryUserStore::new()));
            users.create_user(Some(&candidate(&username, &password))).await.unwrap();

            let user = users.get_user(&username).await.unwrap();
            prop_assert!(!user.is_logged_in);
            prop_assert_eq!(&user.password, &password);
            Ok(())
        })?;
    }

    /// Property: toggling twice with the same candidate restores the state
    #[test]
    fn double_toggle_is_identity(
        username in "[a-z]{1,12}",
        password in "[a-z0-9]{1,12}",
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let users = UserService::new(Arc::new(MemoryUserStore::new()));
            let alice = candidate(&username, &password);
            users.create_user(Some(&alice)).await.unwrap();

            users.toggle_login(Some(&alice)).await.unwrap();
            users.toggle_login(Some(&alice)).await.unwrap();

            prop_assert!(!users.get_user(&username).await.unwrap().is_logged_in);
            Ok(())
        })?;
    }
}
