use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. The server treats roles as:
/// - `merchant`: manages users, inventory and all expenses.
/// - `user`: reads only its own expense data and the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Merchant,
    User,
}

impl Role {
    /// Returns the canonical role string used by the engine/database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merchant => "merchant",
            Self::User => "user",
        }
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub user: super::user::UserView,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub role: Role,
        pub total_expenses: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
        pub role: Role,
    }

    /// Patch body; omitted fields are left unchanged.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub username: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        pub users: Vec<UserView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TotalResponse {
        pub total_expenses: i64,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        /// Unset only while a timer expense is still open.
        pub owner_user_id: Option<Uuid>,
        pub description: String,
        pub amount: i64,
        pub occurred_at: DateTime<Utc>,
        pub is_timer_based: bool,
        pub timer_start: Option<DateTime<Utc>>,
        pub timer_end: Option<DateTime<Utc>>,
        pub inventory_item_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub user_id: Uuid,
        pub description: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CatalogExpenseNew {
        pub user_id: Uuid,
        pub inventory_item_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TimerStart {
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TimerStop {
        /// User the elapsed charge is attributed to.
        pub user_id: Uuid,
    }
}

pub mod inventory {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryItemView {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub price: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryResponse {
        pub items: Vec<InventoryItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryItemNew {
        pub name: String,
        pub description: String,
        pub price: i64,
    }

    /// Patch body; omitted fields are left unchanged. `price: 0` is a valid
    /// explicit update, distinct from the field being omitted.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryItemUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub price: Option<i64>,
    }
}
