//! 表搜索服务
//!
//! 根据表注释（PostgreSQL 下还包括表名）搜索数据表，支持：
//! - MySQL：查询 information_schema.TABLES
//! - PostgreSQL：查询 pg_tables 与表注释
//!
//! 每次搜索建立一个新连接，查询完成后立即关闭。

mod catalog;
mod handlers;
mod routes;
mod service;
mod state;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "search-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "表搜索服务 API",
        version = "0.1.0",
        description = "按表注释搜索 MySQL / PostgreSQL 数据表"
    ),
    paths(
        handlers::search_tables,
        handlers::health_check,
    ),
    components(schemas(
        common::models::SearchRequest,
        common::models::TableDescriptor,
        common::models::DbType,
        handlers::HealthResponse,
    )),
    tags(
        (name = "tables", description = "表搜索端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 先加载 .env，再读取配置
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);
    let addr = config.bind_addr();
    info!(
        mysql = %format!("{}:{}", config.mysql.host, config.mysql.port),
        mysql_db = config.mysql.database.as_deref().unwrap_or("*"),
        postgres = %format!("{}:{}", config.postgres.host, config.postgres.port),
        "数据库配置已加载"
    );

    // 创建路由
    let app = create_router(AppState::new(config));

    // 启动服务
    info!(service = SERVICE_NAME, address = %addr, "启动服务");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app).await.context("服务启动失败")?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
