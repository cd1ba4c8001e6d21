//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Role;

/// Create a user account.
#[derive(Clone, Debug)]
pub struct CreateUserCmd {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl CreateUserCmd {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }
}

/// Patch a user account. Only supplied fields change.
#[derive(Clone, Debug)]
pub struct UpdateUserCmd {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserCmd {
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            username: None,
            password: None,
        }
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Create a settled expense with an explicit amount.
#[derive(Clone, Debug)]
pub struct ExpenseNewCmd {
    pub owner_user_id: Uuid,
    pub description: String,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

impl ExpenseNewCmd {
    #[must_use]
    pub fn new(
        owner_user_id: Uuid,
        description: impl Into<String>,
        amount: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_user_id,
            description: description.into(),
            amount,
            occurred_at,
        }
    }
}

/// Create a settled expense from a catalog item snapshot.
#[derive(Clone, Debug)]
pub struct CatalogExpenseCmd {
    pub owner_user_id: Uuid,
    pub inventory_item_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl CatalogExpenseCmd {
    #[must_use]
    pub fn new(owner_user_id: Uuid, inventory_item_id: Uuid, occurred_at: DateTime<Utc>) -> Self {
        Self {
            owner_user_id,
            inventory_item_id,
            occurred_at,
        }
    }
}

/// Close an open timer expense, attributing it to a user.
#[derive(Clone, Debug)]
pub struct StopTimerCmd {
    pub expense_id: Uuid,
    pub owner_user_id: Uuid,
    pub stopped_at: DateTime<Utc>,
}

impl StopTimerCmd {
    #[must_use]
    pub fn new(expense_id: Uuid, owner_user_id: Uuid, stopped_at: DateTime<Utc>) -> Self {
        Self {
            expense_id,
            owner_user_id,
            stopped_at,
        }
    }
}

/// Create a catalog item.
#[derive(Clone, Debug)]
pub struct InventoryNewCmd {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl InventoryNewCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            created_at,
        }
    }
}

/// Patch a catalog item. Only supplied fields change; `price: Some(0)` is a
/// valid explicit update, distinct from the field being omitted.
#[derive(Clone, Debug)]
pub struct InventoryUpdateCmd {
    pub item_id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryUpdateCmd {
    #[must_use]
    pub fn new(item_id: Uuid, updated_at: DateTime<Utc>) -> Self {
        Self {
            item_id,
            name: None,
            description: None,
            price: None,
            updated_at,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }
}
