// crates/backend-lib/tests/oauth_provisioning.rs
//! Local-user resolution and provisioning from provider identities.
use backend_lib::auth::oauth::resolve_or_provision_user;
use backend_lib::auth::PasswordAuth;
use backend_lib::store::Db;

#[tokio::test]
async fn provider_email_links_to_existing_password_account() {
    let db = Db::open_in_memory().await.unwrap();
    let auth = PasswordAuth::new(db.clone());

    let user_id = auth
        .register("alice", "alice@example.com", "secret1")
        .await
        .unwrap();
    let hash_before = db
        .user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap()
        .password_hash;

    let resolved = resolve_or_provision_user(&db, "alice@example.com", Some("Alice Liddell"))
        .await
        .unwrap();

    // Linked by email; the password credential stays untouched
    assert_eq!(resolved, user_id);
    let user = db.user_by_email("alice@example.com").await.unwrap().unwrap();
    assert_eq!(user.password_hash, hash_before);
    assert_eq!(user.username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn unknown_email_provisions_a_passwordless_account() {
    let db = Db::open_in_memory().await.unwrap();

    let user_id = resolve_or_provision_user(&db, "new@example.com", Some("Ada  Lovelace"))
        .await
        .unwrap();

    let user = db.user_by_email("new@example.com").await.unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.id.len(), 24);
    assert!(user.password_hash.is_none());
    assert_eq!(user.username.as_deref(), Some("ada_lovelace"));
}

#[tokio::test]
async fn missing_display_name_provisions_without_username() {
    let db = Db::open_in_memory().await.unwrap();

    let user_id = resolve_or_provision_user(&db, "anon@example.com", None)
        .await
        .unwrap();

    let user = db.user_by_id(&user_id).await.unwrap().unwrap();
    assert!(user.username.is_none());
    assert_eq!(user.email, "anon@example.com");
}

#[tokio::test]
async fn repeated_resolution_reuses_the_provisioned_account() {
    let db = Db::open_in_memory().await.unwrap();

    let first = resolve_or_provision_user(&db, "repeat@example.com", Some("Repeat User"))
        .await
        .unwrap();
    let second = resolve_or_provision_user(&db, "repeat@example.com", Some("Repeat User"))
        .await
        .unwrap();

    assert_eq!(first, second);
}
