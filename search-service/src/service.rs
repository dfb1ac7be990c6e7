//! 表搜索服务模块

use std::sync::Arc;

use async_trait::async_trait;

use common::config::AppConfig;
use common::errors::AppResult;
use common::models::{DbType, TableDescriptor};

use crate::catalog::{MySqlCatalog, PostgresCatalog, TableCatalog};

/// 表搜索 Trait
#[async_trait]
pub trait TableSearcher: Send + Sync {
    /// 按数据库类型与关键词搜索表
    async fn search(&self, db_type: &str, search_text: &str) -> AppResult<Vec<TableDescriptor>>;
}

/// 按表注释搜索的服务
pub struct TableSearchService {
    config: Arc<AppConfig>,
}

impl TableSearchService {
    /// 创建新的搜索服务实例
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }

    /// 根据数据库类型选择对应的目录实现
    fn catalog(&self, db_type: DbType) -> Box<dyn TableCatalog> {
        let credentials = self.config.credentials(db_type).clone();
        let timeout = self.config.connect_timeout();
        match db_type {
            DbType::MySQL => Box::new(MySqlCatalog::new(credentials, timeout)),
            DbType::Postgres => Box::new(PostgresCatalog::new(credentials, timeout)),
        }
    }
}

#[async_trait]
impl TableSearcher for TableSearchService {
    async fn search(&self, db_type: &str, search_text: &str) -> AppResult<Vec<TableDescriptor>> {
        let db_type: DbType = db_type.parse()?;
        let tables = self.catalog(db_type).search(search_text).await?;
        tracing::debug!(db_type = %db_type, count = tables.len(), "表搜索完成");
        Ok(tables)
    }
}
