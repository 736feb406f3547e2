//! Configuration management for the API server.
//!
//! Everything comes from environment variables (a `.env` file is honored in
//! development via `dotenvy`). There is no global config singleton: `main`
//! loads a `Config` once and threads it through the application state.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
//! - `API_HOST`: bind host (default: 0.0.0.0)
//! - `API_PORT`: bind port (default: 8080)
//! - `CORS_ORIGINS`: comma-separated allowed origins, `*` for permissive
//!   (default: `*`)
//! - `JWT_SECRET`: token signing secret, at least 32 bytes (required)
//! - `JWT_TTL_MINUTES`: access token lifetime (default: 30)

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing. Keep it secret, keep it >= 32 bytes.
    pub secret: String,

    /// Access token lifetime in minutes
    pub token_ttl_minutes: i64,
}

/// Reads an optional environment variable, falling back to `default`.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

/// Reads a required environment variable.
fn env_required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("{} environment variable is required", key))
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// Fails when `DATABASE_URL` or `JWT_SECRET` is missing, when a numeric
    /// variable does not parse, or when the JWT secret is shorter than 32
    /// bytes.
    pub fn from_env() -> anyhow::Result<Self> {
        // Pick up a .env file in development
        dotenvy::dotenv().ok();

        let secret = env_required("JWT_SECRET")?;
        if secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let cors_origins = env_or("CORS_ORIGINS", "*".to_string())?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: env_or("API_HOST", "0.0.0.0".to_string())?,
                port: env_or("API_PORT", 8080)?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: env_required("DATABASE_URL")?,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig {
                secret,
                token_ttl_minutes: env_or("JWT_TTL_MINUTES", 30)?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
