//! Database connection module for the MedReport analyzer
//!
//! Provides a pooled SQLite backend. The server installs a process-wide pool
//! once at startup with [`initialize_database_pool`]; tests build private
//! pools with [`create_pool`].

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Shared SQLite connection pool
pub type DatabasePool = Arc<r2d2::Pool<SqliteConnectionManager>>;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Database configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file. `None` selects an in-memory database.
    pub sqlite_path: Option<String>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Some("./data/medreport.db".to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// In-memory configuration, mostly useful for tests
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: None,
            ..Self::default()
        }
    }

    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let sqlite_path = match env::var("DB_SQLITE_PATH") {
            Ok(path) if path.trim().is_empty() => {
                return Err(DatabaseError::ConfigError("DB_SQLITE_PATH is empty".to_string()));
            }
            Ok(path) if path == ":memory:" => None,
            Ok(path) => Some(path),
            Err(_) => {
                let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
                Some(PathBuf::from(data_dir).join("medreport.db").to_string_lossy().to_string())
            }
        };

        let max_connections = parse_env("DB_MAX_CONNECTIONS", 10u32)?;
        let timeout_seconds = parse_env("DB_TIMEOUT_SECONDS", 30u64)?;

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            sqlite_path.as_deref().unwrap_or(":memory:"),
            max_connections,
            timeout_seconds
        );

        Ok(Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| DatabaseError::ConfigError(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

/// Build a pool for the given configuration and run migrations on it
pub fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let pool = match config.sqlite_path.as_deref() {
        Some(path) => create_file_pool(path, config)?,
        None => create_in_memory_pool(config)?,
    };

    let conn = pool.get()?;
    run_sqlite_migrations(&conn)?;

    Ok(pool)
}

/// Initialize the process-wide database pool
pub fn initialize_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    info!("Initializing database pool");
    let pool = create_pool(config)?;

    DB_POOL
        .set(pool.clone())
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;

    Ok(pool)
}

fn create_file_pool(sqlite_path: &str, config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create directory {:?}: {}", parent, e);
                DatabaseError::ConfigError(format!("cannot create {:?}: {}", parent, e))
            })?;
        }
    }

    let manager = SqliteConnectionManager::file(sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    info!("SQLite connection pool created successfully");
    Ok(Arc::new(pool))
}

fn create_in_memory_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    if config.max_connections > 1 {
        // Every in-memory connection is its own database.
        warn!("In-memory SQLite pool is limited to a single connection");
    }

    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    Ok(Arc::new(pool))
}

/// Describe the database behind a pool, or the error reaching it
pub fn get_connection_info(pool: &DatabasePool) -> Result<String, DatabaseError> {
    let conn = pool.get()?;
    let path: String = conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;

    let location = if path.is_empty() || path == ":memory:" {
        "SQLite in-memory database".to_string()
    } else {
        format!("SQLite database at {}", path)
    };

    let state = pool.state();
    Ok(format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    ))
}
