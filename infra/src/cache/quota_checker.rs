//! Redis backed issuance quota
//!
//! Fixed window per key: the first request creates a counter that expires
//! after the rule's window. A request that would exceed the limit is given
//! back so it does not extend the count.

use async_trait::async_trait;
use std::sync::Arc;

use kg_core::errors::{DomainError, DomainResult};
use kg_core::services::rate_limit::{scope_of, QuotaChecker};
use kg_shared::config::RateLimitConfig;
use kg_shared::email::mask_email;

use super::redis_client::RedisClient;

/// Quota checker shared by every service instance through Redis
#[derive(Clone)]
pub struct RedisQuotaChecker {
    client: Arc<RedisClient>,
    config: RateLimitConfig,
}

impl RedisQuotaChecker {
    pub fn new(client: Arc<RedisClient>, config: RateLimitConfig) -> Self {
        Self { client, config }
    }

    /// Redis key holding the counter for a quota key
    pub fn counter_key(&self, key: &str) -> String {
        self.client.key(&format!("quota:{}", key))
    }

    /// Drop the counter for a quota key
    pub async fn reset(&self, key: &str) -> DomainResult<()> {
        self.client.delete(&self.counter_key(key)).await?;
        Ok(())
    }
}

#[async_trait]
impl QuotaChecker for RedisQuotaChecker {
    async fn check_and_consume_quota(&self, key: &str) -> DomainResult<bool> {
        if !self.config.enabled {
            return Ok(true);
        }

        let scope = scope_of(key);
        let Some(rule) = self.config.rule_for(scope) else {
            tracing::warn!(scope, "No quota rule for scope, allowing request");
            return Ok(true);
        };

        let counter = self.counter_key(key);
        let count = self
            .client
            .increment_in_window(&counter, rule.window_seconds)
            .await
            .map_err(DomainError::from)?;

        if count > i64::from(rule.limit) {
            if let Err(e) = self.client.decrement(&counter).await {
                tracing::warn!(error = %e, "Failed to release rejected quota slot");
            }
            let subject = key.split_once(':').map(|(_, email)| email).unwrap_or(key);
            tracing::debug!(
                scope,
                email = %mask_email(subject),
                count,
                limit = rule.limit,
                "Quota exhausted"
            );
            return Ok(false);
        }

        Ok(true)
    }
}
