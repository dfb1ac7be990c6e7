//! Per-backend table catalogs.
//!
//! Each catalog opens one connection per search, runs its dialect's
//! comment-matching query and closes the connection before returning.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

use common::config::BackendCredentials;
use common::errors::{AppError, AppResult};
use common::models::TableDescriptor;

/// Searches one backend's catalog for tables matching a keyword.
#[async_trait]
pub trait TableCatalog: Send + Sync {
    async fn search(&self, search_text: &str) -> AppResult<Vec<TableDescriptor>>;
}

// ============== SQL ==============

mod queries {
    pub mod mysql {
        /// All user schemas; matched on comment only.
        pub const SEARCH_ALL_SCHEMAS: &str = r#"
            SELECT CAST(TABLE_SCHEMA AS CHAR)  AS database_name,
                   CAST(TABLE_NAME AS CHAR)    AS table_name,
                   CAST(TABLE_COMMENT AS CHAR) AS table_comment
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA NOT IN ('information_schema', 'mysql', 'performance_schema', 'sys')
              AND TABLE_COMMENT LIKE ?
            "#;

        /// Single configured schema; `database_name` is not projected.
        pub const SEARCH_ONE_SCHEMA: &str = r#"
            SELECT CAST(TABLE_NAME AS CHAR)    AS table_name,
                   CAST(TABLE_COMMENT AS CHAR) AS table_comment
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = ?
              AND TABLE_COMMENT LIKE ?
            "#;
    }

    pub mod postgres {
        /// Matched on table name or comment, ignoring case.
        pub const SEARCH_TABLES: &str = r#"
            SELECT t.schemaname::text                AS database_name,
                   t.tablename::text                 AS table_name,
                   obj_description(c.oid, 'pg_class') AS table_comment
            FROM pg_tables t
            LEFT JOIN pg_namespace n ON n.nspname = t.schemaname
            LEFT JOIN pg_class c ON c.relname = t.tablename AND c.relnamespace = n.oid
            WHERE t.schemaname NOT IN ('information_schema', 'pg_catalog')
              AND (t.tablename ILIKE $1 OR obj_description(c.oid, 'pg_class') ILIKE $1)
            "#;
    }
}

/// Wraps the keyword for a substring `LIKE` match.
fn like_pattern(search_text: &str) -> String {
    format!("%{}%", search_text)
}

/// Row shape shared by both dialects.
#[derive(Debug, sqlx::FromRow)]
struct TableRow {
    #[sqlx(default)]
    database_name: Option<String>,
    table_name: String,
    table_comment: Option<String>,
}

impl From<TableRow> for TableDescriptor {
    fn from(row: TableRow) -> Self {
        TableDescriptor {
            database_name: row.database_name,
            table_name: row.table_name,
            table_comment: row.table_comment,
        }
    }
}

async fn connect_within<F, C>(timeout: Duration, connect: F) -> AppResult<C>
where
    F: std::future::Future<Output = Result<C, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, connect).await {
        Ok(result) => result.map_err(|e| AppError::DatabaseConnection(e.to_string())),
        Err(_) => Err(AppError::DatabaseConnection(format!(
            "timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

// ============== MySQL ==============

/// MySQL catalog backed by `information_schema.TABLES`.
pub struct MySqlCatalog {
    credentials: BackendCredentials,
    connect_timeout: Duration,
}

impl MySqlCatalog {
    pub fn new(credentials: BackendCredentials, connect_timeout: Duration) -> Self {
        Self {
            credentials,
            connect_timeout,
        }
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        let c = &self.credentials;
        let options = MySqlConnectOptions::new()
            .host(&c.host)
            .port(c.port)
            .username(&c.user)
            .password(&c.password)
            .charset("utf8mb4");
        match &c.database {
            Some(database) => options.database(database),
            None => options,
        }
    }

    async fn fetch(
        &self,
        conn: &mut MySqlConnection,
        search_text: &str,
    ) -> AppResult<Vec<TableDescriptor>> {
        let pattern = like_pattern(search_text);
        let rows = match &self.credentials.database {
            None => {
                sqlx::query_as::<_, TableRow>(queries::mysql::SEARCH_ALL_SCHEMAS)
                    .bind(pattern)
                    .fetch_all(conn)
                    .await
            }
            Some(database) => {
                sqlx::query_as::<_, TableRow>(queries::mysql::SEARCH_ONE_SCHEMA)
                    .bind(database)
                    .bind(pattern)
                    .fetch_all(conn)
                    .await
            }
        }
        .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        Ok(rows.into_iter().map(TableDescriptor::from).collect())
    }
}

#[async_trait]
impl TableCatalog for MySqlCatalog {
    async fn search(&self, search_text: &str) -> AppResult<Vec<TableDescriptor>> {
        let options = self.connect_options();
        let mut conn =
            connect_within(self.connect_timeout, MySqlConnection::connect_with(&options)).await?;

        let result = self.fetch(&mut conn, search_text).await;
        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "failed to close MySQL connection");
        }
        result
    }
}

// ============== PostgreSQL ==============

/// PostgreSQL catalog backed by `pg_tables` and `pg_class` comments.
pub struct PostgresCatalog {
    credentials: BackendCredentials,
    connect_timeout: Duration,
}

impl PostgresCatalog {
    pub fn new(credentials: BackendCredentials, connect_timeout: Duration) -> Self {
        Self {
            credentials,
            connect_timeout,
        }
    }

    fn connect_options(&self) -> PgConnectOptions {
        let c = &self.credentials;
        let options = PgConnectOptions::new()
            .host(&c.host)
            .port(c.port)
            .username(&c.user)
            .password(&c.password);
        match &c.database {
            Some(database) => options.database(database),
            None => options,
        }
    }

    async fn fetch(
        &self,
        conn: &mut PgConnection,
        search_text: &str,
    ) -> AppResult<Vec<TableDescriptor>> {
        let rows = sqlx::query_as::<_, TableRow>(queries::postgres::SEARCH_TABLES)
            .bind(like_pattern(search_text))
            .fetch_all(conn)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        Ok(rows.into_iter().map(TableDescriptor::from).collect())
    }
}

#[async_trait]
impl TableCatalog for PostgresCatalog {
    async fn search(&self, search_text: &str) -> AppResult<Vec<TableDescriptor>> {
        let options = self.connect_options();
        let mut conn =
            connect_within(self.connect_timeout, PgConnection::connect_with(&options)).await?;

        let result = self.fetch(&mut conn, search_text).await;
        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "failed to close PostgreSQL connection");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(port: u16, database: Option<&str>) -> BackendCredentials {
        BackendCredentials {
            host: "127.0.0.1".into(),
            port,
            user: "nobody".into(),
            password: "secret".into(),
            database: database.map(String::from),
        }
    }

    #[test]
    fn test_like_pattern_wraps_keyword() {
        assert_eq!(like_pattern("archive"), "%archive%");
        assert_eq!(like_pattern("用户"), "%用户%");
    }

    #[test]
    fn test_mysql_queries_exclude_system_schemas() {
        let sql = queries::mysql::SEARCH_ALL_SCHEMAS;
        for schema in ["'information_schema'", "'mysql'", "'performance_schema'", "'sys'"] {
            assert!(sql.contains(schema), "missing {schema}");
        }
        assert!(sql.contains("AS database_name"));
        assert!(!queries::mysql::SEARCH_ONE_SCHEMA.contains("database_name"));
        assert!(queries::mysql::SEARCH_ONE_SCHEMA.contains("TABLE_SCHEMA = ?"));
    }

    #[test]
    fn test_postgres_query_matches_name_or_comment() {
        let sql = queries::postgres::SEARCH_TABLES;
        assert!(sql.contains("t.tablename ILIKE $1"));
        assert!(sql.contains("ILIKE $1)"));
        assert!(sql.contains("NOT IN ('information_schema', 'pg_catalog')"));
    }

    #[test]
    fn test_row_converts_to_descriptor() {
        let row = TableRow {
            database_name: None,
            table_name: "orders".into(),
            table_comment: Some("order log".into()),
        };
        let descriptor = TableDescriptor::from(row);
        assert_eq!(descriptor.database_name, None);
        assert_eq!(descriptor.table_name, "orders");
        assert_eq!(descriptor.table_comment.as_deref(), Some("order log"));
    }

    #[test]
    fn test_mysql_options_only_pin_database_when_configured() {
        let catalog = MySqlCatalog::new(credentials(3306, None), Duration::from_secs(1));
        assert_eq!(catalog.connect_options().get_database(), None);

        let catalog = MySqlCatalog::new(credentials(3306, Some("shop")), Duration::from_secs(1));
        assert_eq!(catalog.connect_options().get_database(), Some("shop"));
    }

    #[tokio::test]
    async fn test_unreachable_mysql_is_a_connection_error() {
        // Port 1 on loopback refuses connections.
        let catalog = MySqlCatalog::new(credentials(1, None), Duration::from_secs(5));
        let err = catalog.search("archive").await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseConnection(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_postgres_is_a_connection_error() {
        let catalog = PostgresCatalog::new(credentials(1, Some("postgres")), Duration::from_secs(5));
        let err = catalog.search("user").await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseConnection(_)), "{err:?}");
    }

    // ============== Live backends ==============
    //
    // Run with `cargo test -- --ignored` against servers described by the
    // MYSQL_* / POSTGRES_* variables. The accounts need CREATE privileges.

    use common::config::AppConfig;

    fn live_config() -> AppConfig {
        AppConfig::load_with_service("search-service-test")
    }

    async fn mysql_exec(config: &AppConfig, statements: &[&str]) {
        let mut creds = config.mysql.clone();
        creds.database = None;
        let options = MySqlCatalog::new(creds, config.connect_timeout()).connect_options();
        let mut conn = MySqlConnection::connect_with(&options).await.unwrap();
        for sql in statements {
            sqlx::query(sql).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();
    }

    async fn postgres_exec(config: &AppConfig, statements: &[&str]) {
        let options = PostgresCatalog::new(config.postgres.clone(), config.connect_timeout())
            .connect_options();
        let mut conn = PgConnection::connect_with(&options).await.unwrap();
        for sql in statements {
            sqlx::query(sql).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a MySQL server"]
    async fn test_mysql_search_across_schemas() {
        let config = live_config();
        mysql_exec(
            &config,
            &[
                "DROP DATABASE IF EXISTS search_it_a",
                "DROP DATABASE IF EXISTS search_it_b",
                "CREATE DATABASE search_it_a",
                "CREATE DATABASE search_it_b",
                "CREATE TABLE search_it_a.users_old (id INT) COMMENT = 'users archive'",
                "CREATE TABLE search_it_b.orders (id INT) COMMENT = 'order log'",
            ],
        )
        .await;

        let mut creds = config.mysql.clone();
        creds.database = None;
        let catalog = MySqlCatalog::new(creds, config.connect_timeout());
        let found: Vec<_> = catalog
            .search("archive")
            .await
            .unwrap()
            .into_iter()
            .filter(|t| {
                matches!(t.database_name.as_deref(), Some("search_it_a") | Some("search_it_b"))
            })
            .collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].database_name.as_deref(), Some("search_it_a"));
        assert_eq!(found[0].table_name, "users_old");
        assert!(found[0].table_comment.as_deref().unwrap().contains("archive"));

        mysql_exec(
            &config,
            &["DROP DATABASE search_it_a", "DROP DATABASE search_it_b"],
        )
        .await;
    }

    #[tokio::test]
    #[ignore = "requires a MySQL server"]
    async fn test_mysql_search_pinned_database_omits_schema() {
        let config = live_config();
        mysql_exec(
            &config,
            &[
                "DROP DATABASE IF EXISTS search_it_shop",
                "CREATE DATABASE search_it_shop",
                "CREATE TABLE search_it_shop.users_old (id INT) COMMENT = 'users archive'",
                "CREATE TABLE search_it_shop.orders (id INT) COMMENT = 'order log'",
            ],
        )
        .await;

        let mut creds = config.mysql.clone();
        creds.database = Some("search_it_shop".into());
        let catalog = MySqlCatalog::new(creds, config.connect_timeout());
        let found = catalog.search("archive").await.unwrap();

        assert_eq!(found.len(), 1);
        assert!(found.iter().all(|t| t.database_name.is_none()));
        assert_eq!(found[0].table_name, "users_old");

        mysql_exec(&config, &["DROP DATABASE search_it_shop"]).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn test_postgres_search_matches_name_or_comment() {
        let config = live_config();
        postgres_exec(
            &config,
            &[
                "DROP SCHEMA IF EXISTS search_it CASCADE",
                "CREATE SCHEMA search_it",
                "CREATE TABLE search_it.user_log (id INT)",
                "CREATE TABLE search_it.orders (id INT)",
                "COMMENT ON TABLE search_it.orders IS 'user activity'",
                "CREATE TABLE search_it.invoices (id INT)",
            ],
        )
        .await;

        let catalog = PostgresCatalog::new(config.postgres.clone(), config.connect_timeout());
        for keyword in ["user", "USER", "User"] {
            let mut names: Vec<_> = catalog
                .search(keyword)
                .await
                .unwrap()
                .into_iter()
                .filter(|t| t.database_name.as_deref() == Some("search_it"))
                .map(|t| (t.table_name, t.table_comment))
                .collect();
            names.sort();
            assert_eq!(
                names,
                vec![
                    ("orders".to_string(), Some("user activity".to_string())),
                    ("user_log".to_string(), None),
                ],
                "keyword {keyword}"
            );
        }

        postgres_exec(&config, &["DROP SCHEMA search_it CASCADE"]).await;
    }
}
