//! Engine selection and schema bootstrap. The engine is picked exactly once
//! at startup from the configured connection string: a `postgres` scheme
//! selects the networked engine, anything else (or nothing) the embedded
//! SQLite file under the per-user data directory. Both engines feed the
//! same `AnyPool`, so the repository carries a single set of queries.

use std::path::PathBuf;
use std::sync::Once;

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::info;

use crate::config::AppConfig;

static DRIVERS: Once = Once::new();

fn install_drivers() {
    DRIVERS.call_once(sqlx::any::install_default_drivers);
}

#[async_trait]
pub trait StorageEngine: Send + Sync {
    fn name(&self) -> &'static str;
    async fn connect(&self) -> Result<AnyPool, sqlx::Error>;
    /// Idempotent: `CREATE TABLE IF NOT EXISTS` only, safe on every startup.
    async fn ensure_schema(&self, pool: &AnyPool) -> Result<(), sqlx::Error>;
}

pub struct SqliteEngine {
    url: String,
    max_connections: u32,
}

impl SqliteEngine {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
        }
    }

    fn file_path(&self) -> Option<PathBuf> {
        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let rest = rest.split('?').next().unwrap_or(rest);
        if rest.is_empty() || rest.contains(":memory:") {
            return None;
        }
        Some(PathBuf::from(rest))
    }
}

const SQLITE_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0,
        priority TEXT NOT NULL DEFAULT 'medium',
        date TEXT DEFAULT NULL
    )",
    "CREATE TABLE IF NOT EXISTS work_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_time TEXT NOT NULL,
        end_time TEXT,
        duration INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS goals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        category TEXT NOT NULL,
        target_date TEXT NOT NULL,
        current_progress INTEGER NOT NULL DEFAULT 0,
        target_value INTEGER NOT NULL DEFAULT 100,
        unit TEXT NOT NULL DEFAULT '%',
        completed INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS habits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        streak INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS habit_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        habit_id INTEGER NOT NULL,
        completed_at TEXT NOT NULL DEFAULT CURRENT_DATE
    )",
];

const POSTGRES_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS todos (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        completed BIGINT NOT NULL DEFAULT 0,
        priority TEXT NOT NULL DEFAULT 'medium',
        date TEXT DEFAULT NULL
    )",
    "CREATE TABLE IF NOT EXISTS work_sessions (
        id BIGSERIAL PRIMARY KEY,
        start_time TEXT NOT NULL,
        end_time TEXT,
        duration BIGINT
    )",
    "CREATE TABLE IF NOT EXISTS goals (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        category TEXT NOT NULL,
        target_date TEXT NOT NULL,
        current_progress BIGINT NOT NULL DEFAULT 0,
        target_value BIGINT NOT NULL DEFAULT 100,
        unit TEXT NOT NULL DEFAULT '%',
        completed BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS habits (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        streak BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS habit_logs (
        id BIGSERIAL PRIMARY KEY,
        habit_id BIGINT NOT NULL,
        completed_at TEXT NOT NULL DEFAULT (CURRENT_DATE::TEXT)
    )",
];

#[async_trait]
impl StorageEngine for SqliteEngine {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn connect(&self) -> Result<AnyPool, sqlx::Error> {
        if let Some(path) = self.file_path()
            && let Some(parent) = path.parent()
        {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
        AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await
    }

    async fn ensure_schema(&self, pool: &AnyPool) -> Result<(), sqlx::Error> {
        for statement in SQLITE_SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }
}

pub struct PostgresEngine {
    url: String,
    max_connections: u32,
}

impl PostgresEngine {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
        }
    }
}

#[async_trait]
impl StorageEngine for PostgresEngine {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn connect(&self) -> Result<AnyPool, sqlx::Error> {
        AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await
    }

    async fn ensure_schema(&self, pool: &AnyPool) -> Result<(), sqlx::Error> {
        for statement in POSTGRES_SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }
}

fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

fn default_sqlite_url() -> String {
    let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    let file = base.join("momentum").join("database.sqlite");
    format!("sqlite://{}?mode=rwc", file.display())
}

pub fn select(config: &AppConfig) -> Box<dyn StorageEngine> {
    match config.database_url.as_deref() {
        Some(url) if is_postgres_url(url) => {
            Box::new(PostgresEngine::new(url, config.db_max_connections))
        }
        Some(url) => Box::new(SqliteEngine::new(url, config.db_max_connections)),
        None => Box::new(SqliteEngine::new(
            default_sqlite_url(),
            config.db_max_connections,
        )),
    }
}

/// Resolve the engine, connect, and make sure the five tables exist.
pub async fn open(config: &AppConfig) -> Result<AnyPool, sqlx::Error> {
    install_drivers();
    let engine = select(config);
    let pool = engine.connect().await?;
    engine.ensure_schema(&pool).await?;
    info!(engine = engine.name(), "storage ready");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(url: Option<&str>) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: url.map(str::to_string),
            db_max_connections: 1,
        }
    }

    #[test]
    fn postgres_scheme_selects_the_networked_engine() {
        let engine = select(&config_with(Some("postgres://localhost/momentum")));
        assert_eq!(engine.name(), "postgres");
        let engine = select(&config_with(Some("postgresql://localhost/momentum")));
        assert_eq!(engine.name(), "postgres");
    }

    #[test]
    fn anything_else_selects_sqlite() {
        assert_eq!(select(&config_with(None)).name(), "sqlite");
        assert_eq!(
            select(&config_with(Some("sqlite://momentum.db"))).name(),
            "sqlite"
        );
    }

    #[test]
    fn default_url_points_into_the_data_dir() {
        let url = default_sqlite_url();
        assert!(url.starts_with("sqlite://"));
        assert!(url.contains("momentum"));
        assert!(url.ends_with("?mode=rwc"));
    }

    #[test]
    fn memory_urls_have_no_file_path() {
        assert_eq!(SqliteEngine::new("sqlite::memory:", 1).file_path(), None);
        assert_eq!(
            SqliteEngine::new("sqlite:///tmp/app/momentum.db?mode=rwc", 1).file_path(),
            Some(PathBuf::from("/tmp/app/momentum.db"))
        );
    }

    #[tokio::test]
    async fn open_creates_all_tables() {
        let pool = open(&config_with(Some("sqlite::memory:")))
            .await
            .expect("in-memory storage should open");

        for table in ["todos", "work_sessions", "goals", "habits", "habit_logs"] {
            sqlx::query(&format!("SELECT count(*) FROM {table}"))
                .execute(&pool)
                .await
                .unwrap_or_else(|_| panic!("table {table} should exist"));
        }
    }

    #[tokio::test]
    async fn ensure_schema_is_safe_to_rerun() {
        let config = config_with(Some("sqlite::memory:"));
        install_drivers();
        let engine = select(&config);
        let pool = engine.connect().await.expect("connect");
        engine.ensure_schema(&pool).await.expect("first run");
        engine.ensure_schema(&pool).await.expect("second run");
    }
}
