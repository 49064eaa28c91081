use crate::note::{NoteId, ValidationError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("note not found: {0}")]
    NotFound(NoteId),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("stored note is unreadable: {0}")]
    CorruptRow(String),

    #[error("note content could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a [`StoreError`], stable enough for a request
/// layer to map onto response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
    Cancelled,
    Config,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Storage(_) | StoreError::CorruptRow(_) | StoreError::Encode(_) => {
                ErrorKind::Storage
            }
            StoreError::Cancelled | StoreError::TimedOut(_) => ErrorKind::Cancelled,
            StoreError::Config(_) => ErrorKind::Config,
        }
    }
}

impl ErrorKind {
    /// HTTP-style status code for this kind of failure.
    ///
    /// Cancellation uses the non-standard 499 ("client closed request").
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Cancelled => 499,
            ErrorKind::Storage | ErrorKind::Config => 500,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
