//! API response wrapper types.
//!
//! Provides a unified response format for all API endpoints. The envelope is
//! always sent with HTTP 200; `success` carries the real outcome.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::models::TableDescriptor;

/// Message returned when the request is missing its backend kind or keyword.
pub const EMPTY_INPUT_MESSAGE: &str = "database type or search keyword must not be empty";

/// Standard API response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,

    /// Human-readable outcome.
    pub message: String,

    /// Response payload; empty on failure.
    pub data: Vec<T>,
}

/// Envelope returned by the table search endpoint.
pub type SearchResponse = ApiResponse<TableDescriptor>;

impl<T> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn ok(data: Vec<T>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    /// Creates an error response with no data.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Vec::new(),
        }
    }
}

impl SearchResponse {
    /// Successful search; the message states the number of tables returned.
    pub fn found(tables: Vec<TableDescriptor>) -> Self {
        let message = format!("found {} table(s)", tables.len());
        Self::ok(tables, message)
    }

    /// Failed search, with the error detail folded into the message.
    pub fn search_failed(error: &AppError) -> Self {
        Self::err(format!("search failed: {}", error))
    }

    /// Rejected request with an empty backend kind or keyword.
    pub fn empty_input() -> Self {
        Self::err(EMPTY_INPUT_MESSAGE)
    }
}
