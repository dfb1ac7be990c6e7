//! Application state for search service.

use std::sync::Arc;

use common::config::AppConfig;

use crate::service::{TableSearchService, TableSearcher};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<dyn TableSearcher>,
}

impl AppState {
    /// Creates a new application state backed by the configured databases.
    pub fn new(config: AppConfig) -> Self {
        Self::with_searcher(Arc::new(TableSearchService::new(Arc::new(config))))
    }

    /// Creates a state around any searcher implementation.
    pub fn with_searcher(searcher: Arc<dyn TableSearcher>) -> Self {
        Self { searcher }
    }
}
