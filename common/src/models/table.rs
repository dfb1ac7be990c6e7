//! Table search models.
//!
//! Contains the search request, the backend kind and the table descriptor
//! returned to clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::AppError;

/// Database type enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// MySQL database.
    MySQL,
    /// PostgreSQL database.
    Postgres,
}

impl DbType {
    /// Returns the default port for this database type.
    pub fn default_port(&self) -> u16 {
        match self {
            DbType::MySQL => 3306,
            DbType::Postgres => 5432,
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::MySQL => write!(f, "mysql"),
            DbType::Postgres => write!(f, "postgres"),
        }
    }
}

impl FromStr for DbType {
    type Err = AppError;

    /// Parses a backend kind, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(DbType::MySQL),
            "postgres" => Ok(DbType::Postgres),
            _ => Err(AppError::UnsupportedDatabaseType(s.to_lowercase())),
        }
    }
}

/// Request body for searching tables by comment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SearchRequest {
    /// Backend kind (`mysql` or `postgres`, case-insensitive).
    #[serde(default)]
    #[validate(length(min = 1, message = "database type must not be empty"))]
    pub db_type: String,

    /// Keyword matched against table comments (and names, on PostgreSQL).
    #[serde(default)]
    #[validate(length(min = 1, message = "search keyword must not be empty"))]
    pub search_text: String,
}

impl SearchRequest {
    pub fn new(db_type: impl Into<String>, search_text: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into(),
            search_text: search_text.into(),
        }
    }

    /// Returns a copy with surrounding whitespace removed from both fields.
    pub fn trimmed(&self) -> Self {
        Self {
            db_type: self.db_type.trim().to_string(),
            search_text: self.search_text.trim().to_string(),
        }
    }
}

/// One table whose name or comment matched the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TableDescriptor {
    /// Schema holding the table. Absent when MySQL is pinned to one database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,

    /// Table name.
    pub table_name: String,

    /// Stored table comment, `null` when none is set.
    pub table_comment: Option<String>,
}
