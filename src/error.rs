//! Error types
//!
//! Crate-wide error classification. Each concern keeps its own `thiserror`
//! enum; `WeekGoalsError` unifies them for callers that need one type.

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::RelayError;
use crate::goals::{DraftFileError, ValidationError};

/// How an error should be surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// User-fixable input problem; blocks the action
    Validation,
    /// Transient network failure; retry is offered
    Connection,
    /// The backend answered with an application error
    Server,
    /// Bad configuration value
    Config,
    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Whether re-invoking the same action could succeed without user edits
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection | Self::Server)
    }
}

#[derive(Debug, Error)]
pub enum WeekGoalsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    DraftFile(#[from] DraftFileError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl WeekGoalsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::DraftFile(_) => ErrorCode::Validation,
            Self::Api(e) => e.code(),
            Self::Relay(_) => ErrorCode::Internal,
            Self::Config(_) => ErrorCode::Config,
        }
    }
}
