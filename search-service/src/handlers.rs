//! Handler模块

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::errors::AppError;
use common::models::SearchRequest;
use common::response::SearchResponse;
use crate::state::AppState;

/// 健康检查中返回的服务名
pub const HEALTH_SERVICE_NAME: &str = "table-search-api";

/// 根据表注释搜索数据表
///
/// 所有结果（包括错误）都以 HTTP 200 返回，`success` 字段表示实际结果。
#[utoipa::path(
    post,
    path = "/api/tables/search",
    tag = "tables",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "搜索结果（成功或失败均由 success 字段表示）", body = SearchResponse)
    )
)]
pub async fn search_tables(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Json<SearchResponse> {
    let req = match payload {
        Ok(Json(req)) => req.trimmed(),
        Err(rejection) => {
            let err = AppError::InvalidRequestBody(rejection.body_text());
            tracing::warn!(code = err.code(), error = %err, "请求体解析失败");
            return Json(SearchResponse::search_failed(&err));
        }
    };

    tracing::info!(db_type = %req.db_type, search_text = %req.search_text, "收到表搜索请求");

    if let Err(errors) = req.validate() {
        tracing::warn!(code = "VALIDATION_ERROR", error = %errors, "搜索参数为空");
        return Json(SearchResponse::empty_input());
    }

    match state.searcher.search(&req.db_type, &req.search_text).await {
        Ok(tables) => {
            tracing::debug!(results = ?tables, "查询结果");
            Json(SearchResponse::found(tables))
        }
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "表搜索失败");
            Json(SearchResponse::search_failed(&err))
        }
    }
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: HEALTH_SERVICE_NAME.to_string(),
    })
}

/// 健康检查响应
#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
}
