use thiserror::Error;

use classroll_auth::{PasswordError, TokenError};
use classroll_core::DomainError;

use crate::store::StoreError;

/// Failure of an application service call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Input rejected before any store access.
    #[error("{0}")]
    Validation(String),

    /// No student with this roll number.
    #[error("student with roll number {0} not found")]
    NotFound(String),

    /// These students already have a record for the current day.
    #[error("attendance already marked for {}", .0.join(", "))]
    AlreadyMarked(Vec<String>),

    /// Email or roll number already registered.
    #[error("{0} is already registered")]
    Conflict(String),

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Hashing or token minting failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ServiceError::Validation(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
