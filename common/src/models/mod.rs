//! Shared data models.

pub mod table;

// Re-export commonly used types
pub use table::{DbType, SearchRequest, TableDescriptor};
