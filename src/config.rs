//! Configuration module
//!
//! Loads configuration from environment variables once at process start.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// HMAC secret used to sign bearer tokens
    pub jwt_secret: String,

    /// Lifetime of issued tokens, in seconds
    pub token_ttl_secs: i64,

    /// Deadline applied to every store call, in milliseconds
    pub store_timeout_ms: u64,

    /// Log output format ("text" or "json")
    pub log_format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingEnv("JWT_SECRET"))?;

        let token_ttl_secs: i64 = env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TOKEN_TTL_SECS"))?;
        if token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("TOKEN_TTL_SECS"));
        }

        let store_timeout_ms = env::var("STORE_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STORE_TIMEOUT_MS"))?;

        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            jwt_secret,
            token_ttl_secs,
            store_timeout_ms,
            log_format,
        })
    }

    /// Deadline for a single store call
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Whether logs should be emitted as JSON lines
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            database_url: "postgres://localhost/bank".to_string(),
            database_max_connections: 10,
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            jwt_secret: "secret".to_string(),
            token_ttl_secs: 3600,
            store_timeout_ms: 250,
            log_format: "JSON".to_string(),
        }
    }

    #[test]
    fn test_store_timeout_duration() {
        assert_eq!(sample().store_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_json_logs_case_insensitive() {
        assert!(sample().json_logs());
        let text = Config {
            log_format: "text".to_string(),
            ..sample()
        };
        assert!(!text.json_logs());
    }

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::MissingEnv("JWT_SECRET").to_string(),
            "Missing environment variable: JWT_SECRET"
        );
    }
}
