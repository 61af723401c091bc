//! The module contains the errors the stores can throw.
//!
//! The same taxonomy is used in-process and across the RPC boundary, so a
//! remote store failure reaches the orchestrator exactly as a local one would:
//!
//! - [`InvalidId`] and [`InvalidInput`] reject a request before anything is written.
//! - [`Forbidden`] is raised when the caller is not a member of the trip.
//! - [`KeyNotFound`] and [`ExistingKey`] report missing or duplicated rows.
//! - [`Unavailable`] means the store could not be reached (including timeouts).
//!
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Unavailable`]: EngineError::Unavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Store errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Unavailable(a), Self::Unavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl EngineError {
    /// Whether the error means the target row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_))
    }
}
