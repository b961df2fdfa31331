//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every engine failure maps to one of these before leaving the service
/// boundary; the HTTP layer uses `status_code`/`error_code` for responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input rejected before any I/O (non-positive amount, self-transfer,
    /// empty client id, malformed currency).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Source account balance does not cover the requested amount.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Account exists but is frozen or closed.
    #[error("Account not transactable: {0}")]
    AccountNotTransactable(String),

    /// The transaction has already been reverted.
    #[error("Already reverted: {0}")]
    AlreadyReverted(String),

    /// Only completed transactions can be reverted.
    #[error("Invalid reversal state: {0}")]
    InvalidReversalState(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Row-lock acquisition timed out; the caller may retry.
    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::InsufficientFunds(_)
            | Self::AccountNotTransactable(_)
            | Self::AlreadyReverted(_)
            | Self::InvalidReversalState(_) => 422,
            Self::Conflict(_) => 409,
            Self::LockTimeout(_) => 503,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::AccountNotTransactable(_) => "ACCOUNT_NOT_TRANSACTABLE",
            Self::AlreadyReverted(_) => "ALREADY_REVERTED",
            Self::InvalidReversalState(_) => "INVALID_REVERSAL_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::LockTimeout(_) => "LOCK_TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the caller may safely retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(
            AppError::InsufficientFunds(String::new()).status_code(),
            422
        );
        assert_eq!(
            AppError::AccountNotTransactable(String::new()).status_code(),
            422
        );
        assert_eq!(AppError::AlreadyReverted(String::new()).status_code(), 422);
        assert_eq!(
            AppError::InvalidReversalState(String::new()).status_code(),
            422
        );
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::LockTimeout(String::new()).status_code(), 503);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::InsufficientFunds(String::new()).error_code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(
            AppError::LockTimeout(String::new()).error_code(),
            "LOCK_TIMEOUT"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_only_lock_timeout_is_retryable() {
        assert!(AppError::LockTimeout(String::new()).is_retryable());
        assert!(!AppError::Validation(String::new()).is_retryable());
        assert!(!AppError::InsufficientFunds(String::new()).is_retryable());
        assert!(!AppError::Database(String::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::InsufficientFunds("msg".into()).to_string(),
            "Insufficient funds: msg"
        );
        assert_eq!(
            AppError::LockTimeout("msg".into()).to_string(),
            "Lock timeout: msg"
        );
    }
}
