//! Expense records.
//!
//! An expense is either settled at creation (direct or catalog-backed) or
//! timer-based. A timer expense starts OPEN (owner unset, amount 0) and is
//! CLOSED exactly once, at which point owner, amount and `timer_end` are set
//! together. There is no transition back from CLOSED.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Billing rate for timer expenses, in currency units per started minute.
pub const TIMER_RATE_PER_MINUTE: i64 = 5;

/// Whole billable minutes between `start` and `end`, rounded up.
///
/// Elapsed time is measured in milliseconds so a sub-minute interval bills
/// one minute. An exactly-zero interval bills zero. A negative interval
/// (clock skew) clamps to zero instead of producing a negative charge.
pub fn billable_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    div_ceil_i64((end - start).num_milliseconds(), 60_000).max(0)
}

/// Equivalent to the standard library's (currently unstable) signed
/// `i64::div_ceil`.
fn div_ceil_i64(lhs: i64, rhs: i64) -> i64 {
    let d = lhs / rhs;
    let r = lhs % rhs;
    if (r > 0 && rhs > 0) || (r < 0 && rhs < 0) {
        d + 1
    } else {
        d
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    /// `None` only while a timer expense is still open.
    pub owner_user_id: Option<Uuid>,
    pub description: String,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
    pub is_timer_based: bool,
    pub timer_start: Option<DateTime<Utc>>,
    pub timer_end: Option<DateTime<Utc>>,
    /// Catalog item this expense was created from, if any. Name and price
    /// are snapshotted at creation; later catalog edits do not apply.
    pub inventory_item_id: Option<Uuid>,
}

impl Expense {
    /// Create a settled expense with a known owner and amount.
    pub(crate) fn new_settled(
        owner_user_id: Uuid,
        description: String,
        amount: i64,
        occurred_at: DateTime<Utc>,
        inventory_item_id: Option<Uuid>,
    ) -> crate::ResultEngine<Self> {
        if amount < 0 {
            return Err(EngineError::InvalidAmount(
                "amount must not be negative".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_user_id: Some(owner_user_id),
            description,
            amount,
            occurred_at,
            is_timer_based: false,
            timer_start: None,
            timer_end: None,
            inventory_item_id,
        })
    }

    /// Create an open timer expense: no owner, no amount yet.
    pub(crate) fn new_timer(description: String, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_user_id: None,
            description,
            amount: 0,
            occurred_at: started_at,
            is_timer_based: true,
            timer_start: Some(started_at),
            timer_end: None,
            inventory_item_id: None,
        }
    }

    /// True while the timer is running and unattributed.
    pub fn is_open_timer(&self) -> bool {
        self.is_timer_based && self.timer_start.is_some() && self.timer_end.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_user_id: Option<String>,
    pub description: String,
    pub amount: i64,
    pub occurred_at: DateTimeUtc,
    pub is_timer_based: bool,
    pub timer_start: Option<DateTimeUtc>,
    pub timer_end: Option<DateTimeUtc>,
    pub inventory_item_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerUserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::inventory::Entity",
        from = "Column::InventoryItemId",
        to = "super::inventory::Column::Id"
    )]
    Inventory,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            owner_user_id: ActiveValue::Set(expense.owner_user_id.map(|id| id.to_string())),
            description: ActiveValue::Set(expense.description.clone()),
            amount: ActiveValue::Set(expense.amount),
            occurred_at: ActiveValue::Set(expense.occurred_at),
            is_timer_based: ActiveValue::Set(expense.is_timer_based),
            timer_start: ActiveValue::Set(expense.timer_start),
            timer_end: ActiveValue::Set(expense.timer_end),
            inventory_item_id: ActiveValue::Set(
                expense.inventory_item_id.map(|id| id.to_string()),
            ),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))?,
            owner_user_id: model
                .owner_user_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
            description: model.description,
            amount: model.amount,
            occurred_at: model.occurred_at,
            is_timer_based: model.is_timer_based,
            timer_start: model.timer_start,
            timer_end: model.timer_end,
            inventory_item_id: model
                .inventory_item_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
        })
    }
}
