//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Unauthenticated`] thrown when a restricted operation has no caller.
//! - [`Forbidden`] thrown when the caller's role does not allow an operation.
//! - [`KeyNotFound`] thrown when an item is not found.
//!
//!  [`Unauthenticated`]: EngineError::Unauthenticated
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("not authorized: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredential,
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unauthenticated, Self::Unauthenticated) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::UserNotFound, Self::UserNotFound) => true,
            (Self::InvalidCredential, Self::InvalidCredential) => true,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
