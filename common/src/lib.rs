//! 表搜索服务公共模块
//!
//! 包含数据模型、统一响应格式、错误类型、配置加载与中间件。

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
