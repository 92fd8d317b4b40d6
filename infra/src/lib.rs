//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Keygate account
//! services. It provides the concrete implementations behind the traits
//! defined in `kg_core`, and the wiring that assembles them into a running
//! verification service.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL user and verification record repositories using SQLx
//! - **Cache**: Redis client and the Redis-backed issuance quota
//! - **Email**: Email transports used by the notification worker
//! - **Telemetry**: `tracing` subscriber setup
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis backed quotas (default)

// Re-export core types for convenience
pub use kg_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and quota counters
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Email transports for verification messages
pub mod email;

/// Tracing subscriber initialisation
pub mod telemetry;

/// Configuration types consumed by the infrastructure services
pub mod config {
    pub use kg_shared::config::{
        AppConfig, CacheConfig, ConfigError, DatabaseConfig, LoggingConfig, MailProvider,
        NotificationConfig, RateLimitConfig,
    };
}

#[cfg(feature = "mysql")]
mod bootstrap;

#[cfg(feature = "mysql")]
pub use bootstrap::{initialize, InfrastructureServices, MySqlVerificationService};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<config::ConfigError> for InfrastructureError {
    fn from(err: config::ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
