//! 路由模块

use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tables/search", post(handlers::search_tables))
        .route("/api/health", get(handlers::health_check))
}
