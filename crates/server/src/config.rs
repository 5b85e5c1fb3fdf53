//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GAVEL_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `GAVEL_HOST` - Bind address (default: 127.0.0.1)
//! - `GAVEL_PORT` - Listen port (default: 9090)
//! - `GAVEL_PUBLIC_DIR` - Root of publicly served assets (default: public)
//! - `GAVEL_ENV` - Deployment environment name (default: development)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Gavel server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Root of publicly served assets; uploaded photos land beneath it
    pub public_dir: PathBuf,
    /// Deployment environment name; anything but "production" enables the
    /// permissive development CORS layer
    pub environment: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("GAVEL_DATABASE_URL")?;
        let host = get_env_or_default("GAVEL_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GAVEL_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("GAVEL_PORT", "9090")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("GAVEL_PORT".to_string(), e.to_string()))?;
        let public_dir = PathBuf::from(get_env_or_default("GAVEL_PUBLIC_DIR", "public"));
        let environment = get_env_or_default("GAVEL_ENV", "development");

        Ok(Self {
            database_url,
            host,
            port,
            public_dir,
            environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the server is running in the production environment.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(environment: &str) -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 9090,
            public_dir: PathBuf::from("public"),
            environment: environment.to_string(),
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config("development");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9090);
    }

    #[test]
    fn test_is_production() {
        assert!(test_config("production").is_production());
        assert!(!test_config("development").is_production());
        assert!(!test_config("staging").is_production());
    }
}
