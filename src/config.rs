//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

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

    /// Per-operation ceiling for withdrawals
    pub withdrawal_limit: Decimal,

    /// Channel topic the audit trail is published on
    pub audit_topic: String,

    /// Consumer group identity of the audit subscriber
    pub audit_consumer_group: String,

    /// When true, the audit decoder also accepts withdrawal messages
    /// ("from account" connector). Off by default.
    pub audit_match_withdrawals: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

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

        let withdrawal_limit = env::var("WITHDRAWAL_LIMIT")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<Decimal>()
            .map_err(|_| ConfigError::InvalidValue("WITHDRAWAL_LIMIT"))?;
        if withdrawal_limit <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue("WITHDRAWAL_LIMIT"));
        }

        let audit_topic = env::var("AUDIT_TOPIC").unwrap_or_else(|_| "change-log".to_string());

        let audit_consumer_group =
            env::var("AUDIT_CONSUMER_GROUP").unwrap_or_else(|_| "ledger-audit-group".to_string());

        let audit_match_withdrawals = env::var("AUDIT_MATCH_WITHDRAWALS")
            .map(|v| bool::from_str(&v).unwrap_or(false))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            withdrawal_limit,
            audit_topic,
            audit_consumer_group,
            audit_match_withdrawals,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
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
