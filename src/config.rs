//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use axum::http::HeaderValue;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_pool_size: usize,
    pub use_tls: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "postgres".to_string(),
            max_pool_size: 10,
            use_tls: false,
        }
    }
}

/// CORS configuration. Exactly one origin is allowed.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origin: HeaderValue,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: HeaderValue::from_static("http://localhost:5000"),
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

impl Settings {
    /// Load settings from the process environment (and `.env`, if present)
    pub fn load() -> Result<Self, ConfigError> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source
    fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let server = ServerConfig {
            host: var("HOST")
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.server.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.server.port),
        };

        let max_pool_size = var("DB_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.database.max_pool_size);

        let ssl_flag = var("DB_SSL")
            .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "require"))
            .unwrap_or(false);

        // DATABASE_URL wins over the individual DB_* variables
        let mut database = if let Some(database_url) = var("DATABASE_URL") {
            Self::parse_database_url(&database_url)?
        } else {
            DatabaseConfig {
                host: var("DB_HOST").unwrap_or(defaults.database.host),
                port: var("DB_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.database.port),
                user: var("DB_USER").unwrap_or(defaults.database.user),
                password: var("DB_PASSWORD").unwrap_or_default(),
                database: var("DB_DATABASE")
                    .or_else(|| var("DB_NAME"))
                    .unwrap_or(defaults.database.database),
                ..DatabaseConfig::default()
            }
        };
        database.max_pool_size = max_pool_size;
        database.use_tls |= ssl_flag;

        let cors = match var("CORS_ORIGIN") {
            Some(origin) => CorsConfig {
                allowed_origin: origin.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue(format!("CORS_ORIGIN is not a valid origin: {}", origin))
                })?,
            },
            None => defaults.cors,
        };

        Ok(Self {
            server,
            database,
            cors,
        })
    }

    /// Parse a DATABASE_URL connection string (postgres://...)
    pub(crate) fn parse_database_url(url: &str) -> Result<DatabaseConfig, ConfigError> {
        let parsed = url::Url::parse(url).map_err(|_| {
            ConfigError::InvalidValue("Invalid DATABASE_URL format (expected postgres://...)".to_string())
        })?;

        let host = parsed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidValue("Missing host in DATABASE_URL".to_string()))?
            .to_string();

        let database = parsed.path().trim_start_matches('/').to_string();
        if database.is_empty() {
            return Err(ConfigError::InvalidValue(
                "Missing database name in DATABASE_URL".to_string(),
            ));
        }

        let use_tls = parsed
            .query_pairs()
            .any(|(k, v)| k == "sslmode" && v == "require");

        Ok(DatabaseConfig {
            host,
            port: parsed.port().unwrap_or(5432),
            user: parsed.username().to_string(),
            password: parsed.password().map(|p| p.to_string()).unwrap_or_default(),
            database,
            use_tls,
            ..DatabaseConfig::default()
        })
    }
}
