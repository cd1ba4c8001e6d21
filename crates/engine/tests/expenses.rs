use chrono::{Duration, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    CatalogExpenseCmd, Caller, CreateUserCmd, Engine, EngineError, ExpenseNewCmd, Identity,
    InventoryNewCmd, InventoryUpdateCmd, Role, StopTimerCmd, TIMER_RATE_PER_MINUTE, User,
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

fn as_caller(user: &User) -> Caller {
    Some(Identity {
        user_id: user.id,
        role: user.role,
    })
}

#[tokio::test]
async fn direct_expense_bumps_total_and_records_one_expense() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let expense = engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(alice.id, "Lunch", 30, Utc::now()),
        )
        .await
        .unwrap();

    assert_eq!(expense.owner_user_id, Some(alice.id));
    assert_eq!(expense.amount, 30);
    assert!(!expense.is_timer_based);

    assert_eq!(engine.user_total(merchant, alice.id).await.unwrap(), 30);

    let expenses = engine.list_for_user(merchant, alice.id).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].description, "Lunch");
    assert_eq!(expenses[0].amount, 30);
}

#[tokio::test]
async fn direct_expense_validates_amount_and_owner() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let err = engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(alice.id, "Refund?", -10, Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(Uuid::new_v4(), "Ghost", 10, Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // Neither attempt left a record or touched the total.
    assert!(engine
        .list_for_user(merchant, alice.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(engine.user_total(merchant, alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn catalog_expense_snapshots_name_and_price() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let coffee = engine
        .create_inventory_item(
            merchant,
            InventoryNewCmd::new("Coffee", "Single espresso", 50, Utc::now()),
        )
        .await
        .unwrap();

    let expense = engine
        .expense_from_catalog(
            merchant,
            CatalogExpenseCmd::new(alice.id, coffee.id, Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(expense.description, "Coffee");
    assert_eq!(expense.amount, 50);
    assert_eq!(expense.inventory_item_id, Some(coffee.id));
    assert_eq!(engine.user_total(merchant, alice.id).await.unwrap(), 50);

    // A later price change must not rewrite history.
    engine
        .update_inventory_item(
            merchant,
            InventoryUpdateCmd::new(coffee.id, Utc::now()).price(80),
        )
        .await
        .unwrap();

    let expenses = engine.list_for_user(merchant, alice.id).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 50);
    assert_eq!(engine.user_total(merchant, alice.id).await.unwrap(), 50);
}

#[tokio::test]
async fn catalog_expense_requires_existing_item() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let err = engine
        .expense_from_catalog(
            merchant,
            CatalogExpenseCmd::new(alice.id, Uuid::new_v4(), Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(engine.user_total(merchant, alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn timer_stop_bills_whole_minutes_rounded_up() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let started_at = Utc::now();
    let timer = engine
        .start_timer(merchant, "Consulting", started_at)
        .await
        .unwrap();
    assert!(timer.is_open_timer());
    assert_eq!(timer.owner_user_id, None);
    assert_eq!(timer.amount, 0);

    // 90 seconds elapsed bills two started minutes.
    let stopped_at = started_at + Duration::seconds(90);
    let closed = engine
        .stop_timer(merchant, StopTimerCmd::new(timer.id, alice.id, stopped_at))
        .await
        .unwrap();

    assert_eq!(closed.amount, 2 * TIMER_RATE_PER_MINUTE);
    assert_eq!(closed.owner_user_id, Some(alice.id));
    assert_eq!(closed.timer_end, Some(stopped_at));
    assert!(!closed.is_open_timer());

    assert_eq!(
        engine.user_total(merchant, alice.id).await.unwrap(),
        2 * TIMER_RATE_PER_MINUTE
    );
    assert!(engine.active_timers(merchant).await.unwrap().is_empty());
}

#[tokio::test]
async fn timer_stop_at_start_instant_bills_nothing() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let started_at = Utc::now();
    let timer = engine
        .start_timer(merchant, "Instant", started_at)
        .await
        .unwrap();

    let closed = engine
        .stop_timer(merchant, StopTimerCmd::new(timer.id, alice.id, started_at))
        .await
        .unwrap();

    assert_eq!(closed.amount, 0);
    assert_eq!(closed.owner_user_id, Some(alice.id));
    assert!(closed.timer_end.is_some());
    assert_eq!(engine.user_total(merchant, alice.id).await.unwrap(), 0);
}

#[tokio::test]
async fn stopping_a_closed_timer_fails_and_preserves_state() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;
    let bob = create_user(&engine, merchant, "bob").await;

    let started_at = Utc::now();
    let timer = engine
        .start_timer(merchant, "Session", started_at)
        .await
        .unwrap();
    let stopped_at = started_at + Duration::seconds(30);
    engine
        .stop_timer(merchant, StopTimerCmd::new(timer.id, alice.id, stopped_at))
        .await
        .unwrap();

    let err = engine
        .stop_timer(
            merchant,
            StopTimerCmd::new(timer.id, bob.id, stopped_at + Duration::minutes(10)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    // The first close stands untouched.
    let expenses = engine.list_for_user(merchant, alice.id).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, TIMER_RATE_PER_MINUTE);
    assert_eq!(expenses[0].timer_end, Some(stopped_at));
    assert_eq!(engine.user_total(merchant, bob.id).await.unwrap(), 0);
}

#[tokio::test]
async fn stopping_a_non_timer_expense_fails() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let expense = engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(alice.id, "Lunch", 30, Utc::now()),
        )
        .await
        .unwrap();

    let err = engine
        .stop_timer(
            merchant,
            StopTimerCmd::new(expense.id, alice.id, Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
    assert_eq!(engine.user_total(merchant, alice.id).await.unwrap(), 30);
}

#[tokio::test]
async fn stopping_an_unknown_expense_fails() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let err = engine
        .stop_timer(
            merchant,
            StopTimerCmd::new(Uuid::new_v4(), alice.id, Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn stopping_onto_an_unknown_user_leaves_the_timer_open() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;

    let timer = engine
        .start_timer(merchant, "Orphan", Utc::now())
        .await
        .unwrap();

    let err = engine
        .stop_timer(
            merchant,
            StopTimerCmd::new(timer.id, Uuid::new_v4(), Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let open = engine.active_timers(merchant).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, timer.id);
}

#[tokio::test]
async fn active_timers_returns_open_state_only() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;

    let started_at = Utc::now();
    let open = engine
        .start_timer(merchant, "Running", started_at)
        .await
        .unwrap();

    let closed = engine
        .start_timer(merchant, "Done", started_at)
        .await
        .unwrap();
    engine
        .stop_timer(
            merchant,
            StopTimerCmd::new(closed.id, alice.id, started_at + Duration::minutes(1)),
        )
        .await
        .unwrap();

    engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(alice.id, "Lunch", 30, Utc::now()),
        )
        .await
        .unwrap();

    let active = engine.active_timers(merchant).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, open.id);
    assert!(active[0].is_open_timer());
}

#[tokio::test]
async fn ledger_writes_are_merchant_only() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;
    let alice_caller = as_caller(&alice);

    let err = engine
        .expense_direct(
            alice_caller,
            ExpenseNewCmd::new(alice.id, "Lunch", 30, Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .start_timer(alice_caller, "Sneaky", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine.active_timers(alice_caller).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .start_timer(None, "Anonymous", Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Unauthenticated);
}

#[tokio::test]
async fn user_expenses_allows_owner_and_merchant_only() {
    let engine = test_engine().await;
    let merchant = merchant_caller(&engine).await;
    let alice = create_user(&engine, merchant, "alice").await;
    let bob = create_user(&engine, merchant, "bob").await;

    engine
        .expense_direct(
            merchant,
            ExpenseNewCmd::new(alice.id, "Lunch", 30, Utc::now()),
        )
        .await
        .unwrap();

    let own = engine
        .user_expenses(as_caller(&alice), alice.id)
        .await
        .unwrap();
    assert_eq!(own.len(), 1);

    let seen = engine.user_expenses(merchant, alice.id).await.unwrap();
    assert_eq!(seen.len(), 1);

    let err = engine
        .user_expenses(as_caller(&bob), alice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let mine = engine.list_own(as_caller(&alice)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].amount, 30);
}
