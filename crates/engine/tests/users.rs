use chrono::Utc;
use sea_orm::Database;

use engine::{
    Caller, CreateUserCmd, Engine, EngineError, ExpenseNewCmd, Identity, Role, UpdateUserCmd, User,
};
use migration::MigratorTrait;

async fn test_engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .token_secret("test-secret")
        .build()
        .await
        .unwrap()
}

async fn merchant_caller(engine: &Engine) -> Caller {
    let merchant = engine.bootstrap_merchant("boss", "s3cret").await.unwrap();
    Some(Identity {
        user_id: merchant.id,
        role: Role::Merchant,
    })
}

async fn create_user(engine: &Engine, caller: Caller, username: &str) -> User {
    engine
        .create_user(caller, CreateUserCmd::new(username, "password", Role::User))
        .await
        .unwrap()
}

#[tokio::test]
async fn login_issues_resolvable_tokens() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let (token, user) = engine.login("alice", "password").await.unwrap();
    assert_eq!(user.id, alice.id);
    assert_eq!(user.role, Role::User);

    let identity = engine.resolve(Some(token.as_str())).unwrap();
    assert_eq!(identity.user_id, alice.id);
    assert_eq!(identity.role, Role::User);
}

#[tokio::test]
async fn login_distinguishes_unknown_user_from_bad_password() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    create_user(&engine, merchant, "alice").await;

    let err = engine.login("ghost", "password").await.unwrap_err();
    assert_eq!(err, EngineError::UserNotFound);

    let err = engine.login("alice", "wrong").await.unwrap_err();
    assert_eq!(err, EngineError::InvalidCredential);
}

#[tokio::test]
async fn token_resolution_downgrades_silently() {
    let engine = test_engine().await;

    assert_eq!(engine.resolve(None), None);
    assert_eq!(engine.resolve(Some("garbage")), None);
    assert_eq!(engine.resolve(Some("")), None);
}

#[tokio::test]
async fn usernames_are_unique() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    create_user(&engine, merchant, "alice").await;

    let err = engine
        .create_user(
            merchant,
            CreateUserCmd::new("alice", "another", Role::User),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));
}

#[tokio::test]
async fn empty_username_or_password_is_rejected() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;

    let err = engine
        .create_user(merchant, CreateUserCmd::new("  ", "password", Role::User))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_user(merchant, CreateUserCmd::new("alice", "", Role::User))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn update_user_renames_and_rehashes() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let updated = engine
        .update_user(
            merchant,
            UpdateUserCmd::new(alice.id)
                .username("alicia")
                .password("wonderland"),
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "alicia");

    engine.login("alicia", "wonderland").await.unwrap();

    let err = engine.login("alicia", "password").await.unwrap_err();
    assert_eq!(err, EngineError::InvalidCredential);
    let err = engine.login("alice", "password").await.unwrap_err();
    assert_eq!(err, EngineError::UserNotFound);
}

#[tokio::test]
async fn update_user_rejects_taken_username() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    create_user(&engine, merchant, "alice").await;
    let bob = create_user(&engine, merchant, "bob").await;

    let err = engine
        .update_user(merchant, UpdateUserCmd::new(bob.id).username("alice"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));
}

#[tokio::test]
async fn deleting_a_user_cascades_to_expenses() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(alice.id, "Lunch", 30, Utc::now()),
        )
        .await
        .unwrap();
    engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(alice.id, "Dinner", 45, Utc::now()),
        )
        .await
        .unwrap();

    engine.delete_user(merchant, alice.id).await.unwrap();

    assert!(engine
        .list_for_user(merchant, alice.id)
        .await
        .unwrap()
        .is_empty());
    let err = engine.user_total(merchant, alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn list_users_excludes_merchant_accounts() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    create_user(&engine, merchant, "bob").await;
    create_user(&engine, merchant, "alice").await;

    let users = engine.list_users(merchant).await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["alice", "bob"]);
    assert!(users.iter().all(|u| u.role == Role::User));
}

#[tokio::test]
async fn totals_are_readable_by_owner_and_merchant() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(alice.id, "Lunch", 30, Utc::now()),
        )
        .await
        .unwrap();

    let alice_caller = Some(Identity {
        user_id: alice.id,
        role: Role::User,
    });
    assert_eq!(engine.my_total(alice_caller).await.unwrap(), 30);
    assert_eq!(engine.user_total(merchant, alice.id).await.unwrap(), 30);

    // The cross-user total query stays merchant-only.
    let err = engine.user_total(alice_caller, alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
