//! Application layer errors.
//!
//! These errors represent failures in orchestration and storage, not
//! business rules. Business rule errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors raised by services and repository adapters.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A repository operation failed for a reason other than "not found".
    #[error("Repository {operation} failed: {reason}")]
    Repository {
        operation: &'static str,
        reason: String,
    },

    /// Filesystem operation failed.
    #[error("I/O error at {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// A stored document could not be decoded.
    #[error("Could not decode {path}: {reason}")]
    Decode { path: String, reason: String },

    /// Store access failed (lock poisoned).
    #[error("Repository store lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Io { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that the templates/schemas directory exists and is readable".into(),
            ],
            Self::Decode { path, .. } => vec![format!("Fix the JSON in {path}")],
            Self::StoreLockError => vec![
                "The repository store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::Repository { .. } => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Decode { .. } => ErrorCategory::Validation,
            Self::Io { .. } | Self::Repository { .. } | Self::StoreLockError => {
                ErrorCategory::Internal
            }
        }
    }
}
