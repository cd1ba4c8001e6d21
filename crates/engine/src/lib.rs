pub use access::{Action, Caller, Identity, Role, authorize};
pub use auth::TOKEN_TTL_HOURS;
pub use commands::{
    CatalogExpenseCmd, CreateUserCmd, ExpenseNewCmd, InventoryNewCmd, InventoryUpdateCmd,
    StopTimerCmd, UpdateUserCmd,
};
pub use error::EngineError;
pub use expenses::{Expense, TIMER_RATE_PER_MINUTE, billable_minutes};
pub use inventory::InventoryItem;
pub use ops::{Engine, EngineBuilder};
pub use users::User;

pub mod access;
mod auth;
mod commands;
mod error;
pub mod expenses;
pub mod inventory;
mod ops;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
