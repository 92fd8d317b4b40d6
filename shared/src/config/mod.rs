//! Configuration module with one sub-module per concern
//!
//! - `cache` - Redis connection used by the quota checker
//! - `database` - MySQL connection pool
//! - `environment` - Environment detection and logging
//! - `notification` - Outbound email queue and transport
//! - `rate_limit` - Per-email issuance quotas
//! - `verification` - Code and token lifetimes

pub mod cache;
pub mod database;
pub mod environment;
pub mod notification;
pub mod rate_limit;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use ::config::ConfigError;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use notification::{MailProvider, NotificationConfig};
pub use rate_limit::{QuotaRule, RateLimitConfig};
pub use verification::VerificationConfig;

/// Prefix for environment variable overrides, e.g. `KEYGATE_DATABASE__URL`
pub const ENV_PREFIX: &str = "KEYGATE";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub verification: VerificationConfig,
    pub notification: NotificationConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Defaults for an environment, before any file or variable overrides
    pub fn for_environment(environment: Environment) -> Self {
        let rate_limit = if environment.is_development() {
            RateLimitConfig::development()
        } else {
            RateLimitConfig::default()
        };

        Self {
            environment,
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            verification: VerificationConfig::default(),
            notification: NotificationConfig::default(),
            rate_limit,
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration for the current environment
    ///
    /// Sources, lowest precedence first: environment defaults, the optional
    /// `config.<env>.toml` in the working directory, `KEYGATE_*` variables.
    /// A `.env` file is read first if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let environment = Environment::from_env();
        Self::load_from(environment, Path::new("."))
    }

    /// Load configuration for `environment`, looking for the config file in `dir`
    pub fn load_from(environment: Environment, dir: &Path) -> Result<Self, ConfigError> {
        let defaults = Self::for_environment(environment);
        let file = dir.join(environment.config_file());

        let mut config: AppConfig = ::config::Config::builder()
            .add_source(::config::Config::try_from(&defaults)?)
            .add_source(::config::File::from(file).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.environment = environment;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the services cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ttls = [
            self.verification.email_otp_ttl_minutes,
            self.verification.password_reset_otp_ttl_minutes,
            self.verification.password_reset_token_ttl_minutes,
        ];
        if ttls.iter().any(|ttl| *ttl <= 0) {
            return Err(ConfigError::Message(
                "verification lifetimes must be positive".to_string(),
            ));
        }
        if self.notification.queue_capacity == 0 {
            return Err(ConfigError::Message(
                "notification.queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.notification.provider == MailProvider::Http && self.notification.api_url.is_empty() {
            return Err(ConfigError::Message(
                "notification.api_url is required for the http provider".to_string(),
            ));
        }
        Ok(())
    }
}
