//! Application error types.
//!
//! Every failure of the search flow is one of these variants. The HTTP layer
//! never turns them into transport errors; handlers fold them into the
//! response envelope instead.

use thiserror::Error;

/// Result alias used across the services.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Request failed input validation (e.g. empty fields).
    #[error("{0}")]
    Validation(String),

    /// Request body could not be parsed.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// Backend kind is not one of the supported databases.
    #[error("unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Backend could not be reached or rejected the credentials.
    #[error("database connection failed: {0}")]
    DatabaseConnection(String),

    /// Query execution or row decoding failed.
    #[error("failed to search tables: {0}")]
    DatabaseQuery(String),
}

impl AppError {
    /// Stable machine-readable code, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidRequestBody(_) => "INVALID_REQUEST_BODY",
            AppError::UnsupportedDatabaseType(_) => "UNSUPPORTED_DATABASE_TYPE",
            AppError::DatabaseConnection(_) => "DATABASE_CONNECTION_ERROR",
            AppError::DatabaseQuery(_) => "DATABASE_QUERY_ERROR",
        }
    }
}
