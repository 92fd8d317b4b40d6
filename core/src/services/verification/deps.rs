//! Collaborators shared by issuance, confirmation and the account flows

use std::sync::Arc;

use crate::services::clock::{Clock, SystemClock};
use crate::services::notification::NotificationQueue;
use crate::services::password::{DefaultPasswordPolicy, PasswordHasher, PasswordPolicy};
use crate::services::rate_limit::{QuotaChecker, UnlimitedQuota};

/// External capabilities the verification flows consume
#[derive(Clone)]
pub struct ServiceDependencies {
    pub notifications: Arc<dyn NotificationQueue>,
    pub quota: Arc<dyn QuotaChecker>,
    pub clock: Arc<dyn Clock>,
    pub password_policy: Arc<dyn PasswordPolicy>,
    pub hasher: PasswordHasher,
}

impl ServiceDependencies {
    /// Defaults: no quota, system clock, built-in password policy, bcrypt default cost
    pub fn new(notifications: Arc<dyn NotificationQueue>) -> Self {
        Self {
            notifications,
            quota: Arc::new(UnlimitedQuota),
            clock: Arc::new(SystemClock),
            password_policy: Arc::new(DefaultPasswordPolicy::default()),
            hasher: PasswordHasher::default(),
        }
    }

    pub fn with_quota(mut self, quota: Arc<dyn QuotaChecker>) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_password_policy(mut self, policy: Arc<dyn PasswordPolicy>) -> Self {
        self.password_policy = policy;
        self
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }
}
