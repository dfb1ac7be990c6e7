//! Service configuration.
//!
//! Loaded once at startup from environment variables (optionally seeded from a
//! `.env` file). Backend credentials are looked up by [`DbType`].

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::models::DbType;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection parameters for one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Fixed target database. For MySQL this also narrows the search to one schema.
    pub database: Option<String>,
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service_name: String,
    pub host: String,
    pub port: u16,
    pub connect_timeout_secs: u64,
    pub mysql: BackendCredentials,
    pub postgres: BackendCredentials,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn load_with_service(service_name: impl Into<String>) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Empty values count as unset. Numbers that fail to parse fall back to
    /// their defaults.
    pub fn from_lookup<F>(service_name: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let mysql = BackendCredentials {
            host: get_or("MYSQL_HOST", "localhost"),
            port: parse_value(get("MYSQL_PORT")).unwrap_or(DbType::MySQL.default_port()),
            user: get_or("MYSQL_USER", "root"),
            password: get_or("MYSQL_PASSWORD", ""),
            database: get("MYSQL_DB"),
        };

        let postgres = BackendCredentials {
            host: get_or("POSTGRES_HOST", "localhost"),
            port: parse_value(get("POSTGRES_PORT")).unwrap_or(DbType::Postgres.default_port()),
            user: get_or("POSTGRES_USER", "postgres"),
            password: get_or("POSTGRES_PASSWORD", ""),
            database: Some(get_or("POSTGRES_DB", "postgres")),
        };

        Self {
            service_name: service_name.into(),
            host: get_or("SERVER_HOST", DEFAULT_HOST),
            port: parse_value(get("SERVER_PORT")).unwrap_or(DEFAULT_PORT),
            connect_timeout_secs: parse_value(get("DB_CONNECT_TIMEOUT_SECS"))
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            mysql,
            postgres,
        }
    }

    /// Returns the credentials configured for a backend.
    pub fn credentials(&self, db_type: DbType) -> &BackendCredentials {
        match db_type {
            DbType::MySQL => &self.mysql,
            DbType::Postgres => &self.postgres,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Loads `.env` from the working directory (best-effort, no error if missing).
///
/// Variables already present in the environment are left untouched.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    let Ok(content) = std::fs::read_to_string(env_path) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"')))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
