//! Expense ledger endpoints.
//!
//! Write operations stamp `Utc::now()` here so the engine's timer state
//! machine stays a pure function of explicit timestamps.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use api_types::expense::{
    CatalogExpenseNew, ExpenseNew, ExpenseView, ExpensesResponse, TimerStart, TimerStop,
};
use api_types::user::TotalResponse;
use engine::{Caller, CatalogExpenseCmd, Expense, ExpenseNewCmd, StopTimerCmd};

use crate::{ServerError, server::ServerState};

fn map_expense(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        owner_user_id: expense.owner_user_id,
        description: expense.description,
        amount: expense.amount,
        occurred_at: expense.occurred_at,
        is_timer_based: expense.is_timer_based,
        timer_start: expense.timer_start,
        timer_end: expense.timer_end,
        inventory_item_id: expense.inventory_item_id,
    }
}

fn map_expenses(expenses: Vec<Expense>) -> ExpensesResponse {
    ExpensesResponse {
        expenses: expenses.into_iter().map(map_expense).collect(),
    }
}

pub async fn mine(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state.engine.list_own(caller).await?;
    Ok(Json(map_expenses(expenses)))
}

pub async fn my_total(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<TotalResponse>, ServerError> {
    let total_expenses = state.engine.my_total(caller).await?;
    Ok(Json(TotalResponse { total_expenses }))
}

/// A user's expense history; merchants, or the owner themselves.
pub async fn user_expenses(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state.engine.user_expenses(caller, user_id).await?;
    Ok(Json(map_expenses(expenses)))
}

/// A user's expense history; merchant-only.
pub async fn list_for_user(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state.engine.list_for_user(caller, user_id).await?;
    Ok(Json(map_expenses(expenses)))
}

pub async fn active_timers(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state.engine.active_timers(caller).await?;
    Ok(Json(map_expenses(expenses)))
}

pub async fn expense_new(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let cmd = ExpenseNewCmd::new(
        payload.user_id,
        payload.description,
        payload.amount,
        Utc::now(),
    );
    let expense = state.engine.expense_direct(caller, cmd).await?;

    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn catalog_expense_new(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<CatalogExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let cmd = CatalogExpenseCmd::new(payload.user_id, payload.inventory_item_id, Utc::now());
    let expense = state.engine.expense_from_catalog(caller, cmd).await?;

    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn timer_start(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<TimerStart>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state
        .engine
        .start_timer(caller, &payload.description, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn timer_stop(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<TimerStop>,
) -> Result<Json<ExpenseView>, ServerError> {
    let cmd = StopTimerCmd::new(expense_id, payload.user_id, Utc::now());
    let expense = state.engine.stop_timer(caller, cmd).await?;

    Ok(Json(map_expense(expense)))
}
