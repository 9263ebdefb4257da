use std::env;

use anyhow::Context;
use tracing::info;

use med_report_data::database::DatabaseConfig;
use med_report_domain::auth::password::DEFAULT_HASH_ROUNDS;
use med_report_domain::auth::TokenConfig;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8000";

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database: DatabaseConfig,
    pub tokens: TokenConfig,
    pub password_hash_rounds: u32,
    /// Single browser origin allowed to call the API with credentials
    pub cors_allowed_origin: String,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// development defaults for anything unset
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", value))?,
            Err(_) => DEFAULT_PORT,
        };

        let password_hash_rounds = match env::var("PASSWORD_HASH_ROUNDS") {
            Ok(value) => value
                .parse::<u32>()
                .with_context(|| format!("PASSWORD_HASH_ROUNDS must be a positive integer, got '{}'", value))?,
            Err(_) => DEFAULT_HASH_ROUNDS,
        };

        let database = DatabaseConfig::from_env().context("Invalid database configuration")?;
        let cors_allowed_origin =
            env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

        let config = Self {
            port,
            database,
            tokens: TokenConfig::from_env(),
            password_hash_rounds,
            cors_allowed_origin,
        };

        info!(
            "Configuration loaded: port={}, database={}, cors_origin={}",
            config.port,
            config.database.sqlite_path.as_deref().unwrap_or(":memory:"),
            config.cors_allowed_origin
        );

        Ok(config)
    }
}
