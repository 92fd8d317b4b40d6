//! Per-key issuance quotas
//!
//! The verification flows only need an allow/deny answer per request. Keys
//! have the form `<scope>:<normalized email>`; the scope selects the rule
//! from [`RateLimitConfig`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use kg_shared::config::{QuotaRule, RateLimitConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::DomainResult;
use crate::services::clock::{Clock, SystemClock};

/// Build the quota key for a scope and normalized email
pub fn quota_key(scope: &str, email: &str) -> String {
    format!("{}:{}", scope, email)
}

/// Scope part of a quota key
pub fn scope_of(key: &str) -> &str {
    key.split_once(':').map(|(scope, _)| scope).unwrap_or(key)
}

/// Allow/deny quota capability
#[async_trait]
pub trait QuotaChecker: Send + Sync {
    /// Count one request against `key`
    ///
    /// Returns `false` when the key is over its quota; the request is then
    /// not counted.
    async fn check_and_consume_quota(&self, key: &str) -> DomainResult<bool>;
}

/// Quota checker that allows everything
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedQuota;

#[async_trait]
impl QuotaChecker for UnlimitedQuota {
    async fn check_and_consume_quota(&self, _key: &str) -> DomainResult<bool> {
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

/// Fixed-window quota checker kept in process memory
pub struct InMemoryQuotaChecker {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryQuotaChecker {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn rule(&self, key: &str) -> Option<QuotaRule> {
        self.config.rule_for(scope_of(key))
    }
}

#[async_trait]
impl QuotaChecker for InMemoryQuotaChecker {
    async fn check_and_consume_quota(&self, key: &str) -> DomainResult<bool> {
        if !self.config.enabled {
            return Ok(true);
        }
        let Some(rule) = self.rule(key) else {
            tracing::warn!(scope = scope_of(key), "No quota rule for scope, allowing");
            return Ok(true);
        };

        let now = self.clock.now();
        let window_length = Duration::seconds(rule.window_seconds as i64);
        let mut windows = self.windows.lock().await;

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });
        if now >= window.started_at + window_length {
            *window = Window {
                started_at: now,
                count: 0,
            };
        }

        if window.count >= rule.limit {
            return Ok(false);
        }
        window.count += 1;
        Ok(true)
    }
}
