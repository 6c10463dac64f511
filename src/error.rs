// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Engine error types.

/// Error type shared by the stores and the activity engine.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AppError {
    /// Whether the failed read-modify-write may be re-applied against fresh data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ConcurrentModification(_))
    }

    /// Stable short code for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::ConcurrentModification(_) => "concurrent_modification",
            AppError::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(errors.to_string())
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
