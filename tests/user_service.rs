mod support;

use postboard::application::error::ServiceError;
use postboard::application::users::{CreateUserCommand, UserService};
use postboard::domain::types::Role;

use support::{MemoryStore, admin, member, user_service};

fn signup(username: &str, email: Option<&str>) -> CreateUserCommand {
    CreateUserCommand {
        username: username.to_string(),
        password: "secret".to_string(),
        nickname: "Nick".to_string(),
        email: email.map(str::to_string),
    }
}

async fn register(users: &UserService, username: &str) -> i64 {
    users.create(signup(username, None)).await.unwrap()
}

#[tokio::test]
async fn create_normalizes_fields_and_grants_user_role() {
    let store = MemoryStore::new();
    let users = user_service(&store);

    let id = users
        .create(CreateUserCommand {
            username: "  Alice ".to_string(),
            password: "secret".to_string(),
            nickname: " Wonder ".to_string(),
            email: Some("Alice@Example.COM".to_string()),
        })
        .await
        .unwrap();

    let user = users.get(Some(&member(id)), id).await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.nickname, "wonder");
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    assert_ne!(user.password_hash, "secret");
    assert_eq!(users.roles(id).await.unwrap(), vec![Role::User]);
}

#[tokio::test]
async fn usernames_differing_in_case_and_whitespace_collide() {
    let store = MemoryStore::new();
    let users = user_service(&store);

    register(&users, "Alice ").await;
    let err = users.create(signup(" alice", None)).await.unwrap_err();
    match err {
        ServiceError::Duplicate(message) => assert_eq!(message, "username already exists"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_email_is_reported_by_key() {
    let store = MemoryStore::new();
    let users = user_service(&store);

    users.create(signup("alice", Some("a@x.io"))).await.unwrap();
    let err = users
        .create(signup("bob", Some("A@X.io")))
        .await
        .unwrap_err();
    match err {
        ServiceError::Duplicate(message) => assert_eq!(message, "email already exists"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn blank_fields_are_rejected_before_storage() {
    let store = MemoryStore::new();
    let users = user_service(&store);

    let mut command = signup("alice", None);
    command.password = "   ".to_string();
    assert!(matches!(
        users.create(command).await,
        Err(ServiceError::InvalidRequest(_))
    ));
    assert!(matches!(
        users.create(signup(" ", None)).await,
        Err(ServiceError::InvalidRequest(_))
    ));
    assert_eq!(store.user_writes(), 0);
}

#[tokio::test]
async fn get_is_limited_to_self_or_admin() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;
    let bob = register(&users, "bob").await;

    assert!(matches!(
        users.get(None, alice).await,
        Err(ServiceError::Unauthorized)
    ));
    assert!(matches!(
        users.get(Some(&member(bob)), alice).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(users.get(Some(&admin(bob)), alice).await.is_ok());
    assert!(matches!(
        users.get(Some(&admin(bob)), 999).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn list_is_admin_only_and_limit_normalized() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;
    register(&users, "bob").await;

    assert!(matches!(
        users.list(Some(&member(alice)), 10).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        users.list(Some(&admin(alice)), 0).await,
        Err(ServiceError::InvalidRequest(_))
    ));
    assert_eq!(users.list(Some(&admin(alice)), 1).await.unwrap().len(), 1);
    assert_eq!(users.list(Some(&admin(alice)), 5000).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unchanged_nickname_performs_no_write() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;
    let writes = store.user_writes();

    users
        .change_nickname(Some(&member(alice)), alice, "  NICK ")
        .await
        .unwrap();
    assert_eq!(store.user_writes(), writes);

    users
        .change_nickname(Some(&member(alice)), alice, "Other")
        .await
        .unwrap();
    assert_eq!(store.user_writes(), writes + 1);
    let user = users.get(Some(&member(alice)), alice).await.unwrap();
    assert_eq!(user.nickname, "other");
}

#[tokio::test]
async fn account_edits_by_other_members_are_forbidden_without_writes() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;
    let bob = register(&users, "bob").await;
    let writes = store.user_writes();
    let intruder = member(bob);

    assert!(matches!(
        users.change_nickname(Some(&intruder), alice, "hijacked").await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        users.change_email(Some(&intruder), alice, Some("bob@x.io")).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        users.change_password(Some(&intruder), alice, "pwned").await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(
        users.change_nickname(None, alice, "anon").await,
        Err(ServiceError::Unauthorized)
    ));
    assert_eq!(store.user_writes(), writes);

    let user = users.get(Some(&member(alice)), alice).await.unwrap();
    assert_eq!(user.nickname, "nick");
    assert_eq!(user.email, None);
    users.login("alice", "secret").await.unwrap();
}

#[tokio::test]
async fn nickname_change_for_missing_user_is_not_found() {
    let store = MemoryStore::new();
    let users = user_service(&store);

    assert!(matches!(
        users.change_nickname(Some(&admin(1)), 404, "nick").await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn reusing_the_current_password_is_rejected() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;
    let writes = store.user_writes();

    let err = users
        .change_password(Some(&member(alice)), alice, "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest(_)));
    assert_eq!(store.user_writes(), writes);

    users
        .change_password(Some(&member(alice)), alice, "fresh")
        .await
        .unwrap();
    assert_eq!(users.login("alice", "fresh").await.unwrap(), alice);
}

#[tokio::test]
async fn email_change_lowercases_and_detects_collisions() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;
    let bob = users.create(signup("bob", Some("bob@x.io"))).await.unwrap();

    users
        .change_email(Some(&member(alice)), alice, Some("Alice@X.io"))
        .await
        .unwrap();
    let user = users.get(Some(&member(alice)), alice).await.unwrap();
    assert_eq!(user.email.as_deref(), Some("alice@x.io"));

    let err = users
        .change_email(Some(&member(alice)), alice, Some("BOB@x.io"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate(_)));

    users
        .change_email(Some(&member(bob)), bob, None)
        .await
        .unwrap();
    assert_eq!(users.get(Some(&member(bob)), bob).await.unwrap().email, None);
}

#[tokio::test]
async fn delete_is_self_or_admin_and_reports_missing_rows() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;
    let bob = register(&users, "bob").await;
    store.seed_post(alice, "title", "body");

    assert!(matches!(
        users.delete(Some(&member(bob)), alice).await,
        Err(ServiceError::Forbidden)
    ));
    users.delete(Some(&member(alice)), alice).await.unwrap();
    assert!(store.post(1).is_none());
    assert!(matches!(
        users.delete(Some(&admin(bob)), alice).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn login_distinguishes_unknown_user_from_bad_password() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;

    assert_eq!(users.login(" Alice", "secret").await.unwrap(), alice);
    assert!(matches!(
        users.login("nobody", "secret").await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        users.login("alice", "wrong").await,
        Err(ServiceError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn grant_role_promotes_existing_user() {
    let store = MemoryStore::new();
    let users = user_service(&store);
    let alice = register(&users, "alice").await;

    assert_eq!(users.grant_role("ALICE", Role::Admin).await.unwrap(), alice);
    assert_eq!(users.grant_role("alice", Role::Admin).await.unwrap(), alice);
    assert_eq!(
        users.roles(alice).await.unwrap(),
        vec![Role::User, Role::Admin]
    );
    assert!(matches!(
        users.grant_role("ghost", Role::Admin).await,
        Err(ServiceError::NotFound(_))
    ));
}
