//! Shared utilities and common types for the Keygate services
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types and loading
//! - Error response structures and error codes
//! - Email normalization and masking helpers

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, LoggingConfig,
    NotificationConfig, RateLimitConfig, VerificationConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
pub use utils::email;
