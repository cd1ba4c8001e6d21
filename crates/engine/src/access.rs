//! Access policy.
//!
//! A pure decision function over the two-role model: merchants manage
//! accounts, inventory and expenses; users only read their own data and the
//! catalog. The caller is explicit context, never ambient state, so the
//! policy can be tested in isolation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Account role. Closed set; stored as a string column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Merchant,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merchant => "merchant",
            Self::User => "user",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "merchant" => Ok(Self::Merchant),
            "user" => Ok(Self::User),
            other => Err(EngineError::Internal(format!("invalid role: {other}"))),
        }
    }
}

/// A resolved caller: who is asking, and with which role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

/// Caller context for every operation. `None` means anonymous.
pub type Caller = Option<Identity>;

/// One variant per exposed operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Login,
    MyExpenses,
    MyTotalExpenses,
    ListUsers,
    ExpensesForUser,
    UserExpenseTotal,
    ActiveTimers,
    ListInventory,
    GetInventoryItem,
    /// Reading a specific user's expense history; allowed for merchants and
    /// for the owner themselves.
    UserExpenses { owner_id: Uuid },
    CreateUser,
    UpdateUser,
    DeleteUser,
    CreateExpense,
    CreateExpenseFromInventory,
    StartTimerExpense,
    StopTimerExpense,
    CreateInventoryItem,
    UpdateInventoryItem,
    DeleteInventoryItem,
}

/// Decide whether `caller` may perform `action`.
///
/// Distinguishes "no caller at all" ([`EngineError::Unauthenticated`]) from
/// "caller present but insufficient" ([`EngineError::Forbidden`]).
pub fn authorize(caller: Caller, action: Action) -> ResultEngine<()> {
    let identity = match (caller, action) {
        (_, Action::Login) => return Ok(()),
        (None, _) => return Err(EngineError::Unauthenticated),
        (Some(identity), _) => identity,
    };

    match action {
        Action::Login => Ok(()),

        // Any authenticated caller may read their own data and the catalog.
        Action::MyExpenses
        | Action::MyTotalExpenses
        | Action::ListInventory
        | Action::GetInventoryItem => Ok(()),

        // Merchants read anyone; users only themselves.
        Action::UserExpenses { owner_id } => {
            if identity.role == Role::Merchant || identity.user_id == owner_id {
                Ok(())
            } else {
                Err(EngineError::Forbidden(
                    "cannot view this user's expenses".to_string(),
                ))
            }
        }

        // Everything else is merchant-only.
        Action::ListUsers
        | Action::ExpensesForUser
        | Action::UserExpenseTotal
        | Action::ActiveTimers
        | Action::CreateUser
        | Action::UpdateUser
        | Action::DeleteUser
        | Action::CreateExpense
        | Action::CreateExpenseFromInventory
        | Action::StartTimerExpense
        | Action::StopTimerExpense
        | Action::CreateInventoryItem
        | Action::UpdateInventoryItem
        | Action::DeleteInventoryItem => {
            if identity.role == Role::Merchant {
                Ok(())
            } else {
                Err(EngineError::Forbidden(
                    "merchant role required".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merchant() -> Caller {
        Some(Identity {
            user_id: Uuid::new_v4(),
            role: Role::Merchant,
        })
    }

    fn user() -> Caller {
        Some(Identity {
            user_id: Uuid::new_v4(),
            role: Role::User,
        })
    }

    const MERCHANT_ONLY: [Action; 14] = [
        Action::ListUsers,
        Action::ExpensesForUser,
        Action::UserExpenseTotal,
        Action::ActiveTimers,
        Action::CreateUser,
        Action::UpdateUser,
        Action::DeleteUser,
        Action::CreateExpense,
        Action::CreateExpenseFromInventory,
        Action::StartTimerExpense,
        Action::StopTimerExpense,
        Action::CreateInventoryItem,
        Action::UpdateInventoryItem,
        Action::DeleteInventoryItem,
    ];

    #[test]
    fn anonymous_may_only_login() {
        assert_eq!(authorize(None, Action::Login), Ok(()));

        for action in MERCHANT_ONLY {
            assert_eq!(authorize(None, action), Err(EngineError::Unauthenticated));
        }
        assert_eq!(
            authorize(None, Action::MyExpenses),
            Err(EngineError::Unauthenticated)
        );
        assert_eq!(
            authorize(None, Action::ListInventory),
            Err(EngineError::Unauthenticated)
        );
        assert_eq!(
            authorize(
                None,
                Action::UserExpenses {
                    owner_id: Uuid::new_v4()
                }
            ),
            Err(EngineError::Unauthenticated)
        );
    }

    #[test]
    fn users_are_denied_every_merchant_operation() {
        for action in MERCHANT_ONLY {
            assert!(matches!(
                authorize(user(), action),
                Err(EngineError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn merchants_are_allowed_every_merchant_operation() {
        for action in MERCHANT_ONLY {
            assert_eq!(authorize(merchant(), action), Ok(()));
        }
    }

    #[test]
    fn any_authenticated_caller_reads_own_data_and_catalog() {
        for caller in [merchant(), user()] {
            assert_eq!(authorize(caller, Action::MyExpenses), Ok(()));
            assert_eq!(authorize(caller, Action::MyTotalExpenses), Ok(()));
            assert_eq!(authorize(caller, Action::ListInventory), Ok(()));
            assert_eq!(authorize(caller, Action::GetInventoryItem), Ok(()));
        }
    }

    #[test]
    fn user_expenses_allows_self_and_merchant_only() {
        let owner = Uuid::new_v4();
        let same = Some(Identity {
            user_id: owner,
            role: Role::User,
        });
        assert_eq!(
            authorize(same, Action::UserExpenses { owner_id: owner }),
            Ok(())
        );
        assert_eq!(
            authorize(merchant(), Action::UserExpenses { owner_id: owner }),
            Ok(())
        );
        assert!(matches!(
            authorize(user(), Action::UserExpenses { owner_id: owner }),
            Err(EngineError::Forbidden(_))
        ));
    }
}
