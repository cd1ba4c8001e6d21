//! Expense ledger operations.
//!
//! Creating a settled expense and bumping the owner's running total are one
//! logical unit: both run inside a single DB transaction, and the total
//! update is a single atomic add-in-place so concurrent creations for the
//! same user cannot lose increments.

use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    CatalogExpenseCmd, EngineError, Expense, ExpenseNewCmd, ResultEngine, StopTimerCmd,
    access::{Action, Caller, authorize},
    expenses,
    expenses::{TIMER_RATE_PER_MINUTE, billable_minutes},
    inventory, users,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Create a settled expense with an explicit owner and amount, and bump
    /// the owner's running total by that amount.
    pub async fn expense_direct(&self, caller: Caller, cmd: ExpenseNewCmd) -> ResultEngine<Expense> {
        authorize(caller, Action::CreateExpense)?;
        let description = normalize_required_name(&cmd.description, "description")?;
        let expense =
            Expense::new_settled(cmd.owner_user_id, description, cmd.amount, cmd.occurred_at, None)?;
        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, cmd.owner_user_id).await?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            self.increment_total_expenses(&db_tx, cmd.owner_user_id, expense.amount)
                .await?;
            Ok(expense)
        })
    }

    /// Create a settled expense from a catalog item, snapshotting its name
    /// and price so later catalog edits never alter the expense record.
    pub async fn expense_from_catalog(
        &self,
        caller: Caller,
        cmd: CatalogExpenseCmd,
    ) -> ResultEngine<Expense> {
        authorize(caller, Action::CreateExpenseFromInventory)?;
        with_tx!(self, |db_tx| {
            let item = inventory::Entity::find_by_id(cmd.inventory_item_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("inventory item not exists".to_string())
                })?;
            self.require_user_by_id(&db_tx, cmd.owner_user_id).await?;

            let expense = Expense::new_settled(
                cmd.owner_user_id,
                item.name,
                item.price,
                cmd.occurred_at,
                Some(cmd.inventory_item_id),
            )?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            self.increment_total_expenses(&db_tx, cmd.owner_user_id, expense.amount)
                .await?;
            Ok(expense)
        })
    }

    /// Open a timer expense: no owner, no amount until it is stopped.
    pub async fn start_timer(
        &self,
        caller: Caller,
        description: &str,
        started_at: DateTime<Utc>,
    ) -> ResultEngine<Expense> {
        authorize(caller, Action::StartTimerExpense)?;
        let description = normalize_required_name(description, "description")?;
        let expense = Expense::new_timer(description, started_at);
        expenses::ActiveModel::from(&expense)
            .insert(&self.database)
            .await?;
        Ok(expense)
    }

    /// Close an open timer expense.
    ///
    /// Bills whole minutes rounded up at [`TIMER_RATE_PER_MINUTE`], sets
    /// owner, amount and `timer_end` together, then bumps the owner's total.
    /// The close is a compare-and-set: it only applies while `timer_end` is
    /// still unset, so of two concurrent stops the first wins and the second
    /// fails with [`EngineError::InvalidState`].
    pub async fn stop_timer(&self, caller: Caller, cmd: StopTimerCmd) -> ResultEngine<Expense> {
        authorize(caller, Action::StopTimerExpense)?;
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(cmd.expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            if !model.is_timer_based {
                return Err(EngineError::InvalidState(
                    "expense is not timer-based".to_string(),
                ));
            }
            let Some(timer_start) = model.timer_start else {
                return Err(EngineError::InvalidState(
                    "timer was never started".to_string(),
                ));
            };
            if model.timer_end.is_some() {
                return Err(EngineError::InvalidState(
                    "timer already stopped".to_string(),
                ));
            }

            self.require_user_by_id(&db_tx, cmd.owner_user_id).await?;

            let minutes = billable_minutes(timer_start, cmd.stopped_at);
            let amount = minutes * TIMER_RATE_PER_MINUTE;

            let closed = expenses::Entity::update_many()
                .col_expr(
                    expenses::Column::OwnerUserId,
                    Expr::value(cmd.owner_user_id.to_string()),
                )
                .col_expr(expenses::Column::Amount, Expr::value(amount))
                .col_expr(expenses::Column::TimerEnd, Expr::value(cmd.stopped_at))
                .filter(expenses::Column::Id.eq(cmd.expense_id.to_string()))
                .filter(expenses::Column::TimerEnd.is_null())
                .exec(&db_tx)
                .await?;
            if closed.rows_affected == 0 {
                return Err(EngineError::InvalidState(
                    "timer already stopped".to_string(),
                ));
            }

            self.increment_total_expenses(&db_tx, cmd.owner_user_id, amount)
                .await?;

            let model = expenses::Entity::find_by_id(cmd.expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            Expense::try_from(model)
        })
    }

    /// The caller's own expense history, newest first.
    pub async fn list_own(&self, caller: Caller) -> ResultEngine<Vec<Expense>> {
        authorize(caller, Action::MyExpenses)?;
        let identity = caller.ok_or(EngineError::Unauthenticated)?;
        self.expenses_owned_by(identity.user_id).await
    }

    /// A specific user's expense history; merchants only.
    pub async fn list_for_user(&self, caller: Caller, user_id: Uuid) -> ResultEngine<Vec<Expense>> {
        authorize(caller, Action::ExpensesForUser)?;
        self.expenses_owned_by(user_id).await
    }

    /// A specific user's expense history; merchants, or the owner themselves.
    pub async fn user_expenses(&self, caller: Caller, user_id: Uuid) -> ResultEngine<Vec<Expense>> {
        authorize(caller, Action::UserExpenses { owner_id: user_id })?;
        self.expenses_owned_by(user_id).await
    }

    /// All timer expenses still in the open state: timer running, no owner.
    pub async fn active_timers(&self, caller: Caller) -> ResultEngine<Vec<Expense>> {
        authorize(caller, Action::ActiveTimers)?;
        let models = expenses::Entity::find()
            .filter(expenses::Column::IsTimerBased.eq(true))
            .filter(expenses::Column::TimerStart.is_not_null())
            .filter(expenses::Column::TimerEnd.is_null())
            .filter(expenses::Column::OwnerUserId.is_null())
            .order_by_asc(expenses::Column::TimerStart)
            .all(&self.database)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }

    /// Remove every expense owned by `user_id`.
    ///
    /// Part of user deletion; the total is not adjusted because the owning
    /// user row is deleted in the same transaction.
    pub(crate) async fn delete_expenses_for_user(
        &self,
        db: &impl ConnectionTrait,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        expenses::Entity::delete_many()
            .filter(expenses::Column::OwnerUserId.eq(user_id.to_string()))
            .exec(db)
            .await?;
        Ok(())
    }

    async fn expenses_owned_by(&self, user_id: Uuid) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::OwnerUserId.eq(user_id.to_string()))
            .order_by_desc(expenses::Column::OccurredAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }

    /// Atomic add-in-place on the owner's running total.
    async fn increment_total_expenses(
        &self,
        db: &impl ConnectionTrait,
        user_id: Uuid,
        amount: i64,
    ) -> ResultEngine<()> {
        let updated = users::Entity::update_many()
            .col_expr(
                users::Column::TotalExpenses,
                Expr::col(users::Column::TotalExpenses).add(amount),
            )
            .filter(users::Column::Id.eq(user_id.to_string()))
            .exec(db)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }
}
