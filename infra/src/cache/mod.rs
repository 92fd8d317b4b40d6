//! Cache module for Redis-based quota counters

pub mod quota_checker;
pub mod redis_client;


pub use quota_checker::RedisQuotaChecker;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use kg_shared::config::CacheConfig;
