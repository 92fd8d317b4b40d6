//! Issuance policy: when to create a record, what it supersedes, and who gets told

use kg_shared::email::{mask_email, parse_email};
use std::sync::Arc;

use crate::domain::entities::user::User;
use crate::domain::entities::verification_record::{Purpose, VerificationRecord};
use crate::errors::{DomainResult, ValidationError, VerificationError};
use crate::repositories::{UserRepository, VerificationRepository};
use crate::services::clock::Clock;
use crate::services::notification::{Notification, NotificationQueue};
use crate::services::rate_limit::{quota_key, QuotaChecker};

use super::code_generator::CodeGenerator;
use super::config::VerificationServiceConfig;
use super::deps::ServiceDependencies;
use super::types::IssueAcknowledgement;

/// Creates verification records and queues their notifications
pub struct IssuancePolicy<U, R>
where
    U: UserRepository,
    R: VerificationRepository,
{
    users: Arc<U>,
    records: Arc<R>,
    quota: Arc<dyn QuotaChecker>,
    notifications: Arc<dyn NotificationQueue>,
    clock: Arc<dyn Clock>,
    generator: CodeGenerator,
    config: VerificationServiceConfig,
}

impl<U, R> IssuancePolicy<U, R>
where
    U: UserRepository,
    R: VerificationRepository,
{
    pub fn new(
        users: Arc<U>,
        records: Arc<R>,
        deps: &ServiceDependencies,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            users,
            records,
            quota: deps.quota.clone(),
            notifications: deps.notifications.clone(),
            clock: deps.clock.clone(),
            generator: CodeGenerator::new(),
            config,
        }
    }

    /// Handle a client request for a new code or link
    ///
    /// 1. Validates and normalizes the email
    /// 2. Consumes one unit of the purpose's quota for that email
    /// 3. Looks up the user; unknown emails get the same acknowledgement
    ///    with nothing stored or sent, after one read of the purpose's
    ///    collection in place of the write
    /// 4. Issues the record and queues the notification
    ///
    /// # Errors
    /// * `ValidationError::InvalidEmail` - Malformed email, nothing else touched
    /// * `VerificationError::RateLimitExceeded` - Quota denied
    /// * `VerificationError::AlreadyVerified` - Email verification requested
    ///   for a verified account
    /// * `DomainError::Internal` - Store or random source failure
    pub async fn request_issue(
        &self,
        email: &str,
        purpose: Purpose,
    ) -> DomainResult<IssueAcknowledgement> {
        let email = parse_email(email).ok_or(ValidationError::InvalidEmail)?;

        let scope = purpose.quota_scope();
        if !self
            .quota
            .check_and_consume_quota(&quota_key(scope, &email))
            .await?
        {
            tracing::warn!(
                email = %mask_email(&email),
                scope = scope,
                event = "rate_limit_exceeded",
                "Issue request denied by quota"
            );
            return Err(VerificationError::RateLimitExceeded {
                scope: scope.to_string(),
            }
            .into());
        }

        let acknowledgement = IssueAcknowledgement::for_purpose(purpose);

        let Some(user) = self.users.find_by_email(&email).await? else {
            // Generate and hit the purpose's collection like a real issue does
            let secret = self.generator.generate(purpose.secret_kind())?;
            let _ = self.records.find_by_secret(purpose, &secret).await?;
            tracing::debug!(
                email = %mask_email(&email),
                purpose = %purpose,
                event = "issue_skipped",
                "No account for email, acknowledging without issuing"
            );
            return Ok(acknowledgement);
        };

        if purpose == Purpose::EmailVerification && user.is_email_verified {
            return Err(VerificationError::AlreadyVerified.into());
        }

        self.issue_for_user(&user, purpose).await?;
        Ok(acknowledgement)
    }

    /// Create and persist a record for a known user, then queue its notification
    ///
    /// No quota is consulted. For purposes that supersede, outstanding records
    /// are invalidated in the same atomic unit as the insert. A failed enqueue
    /// is logged; the record stays issued.
    pub async fn issue_for_user(
        &self,
        user: &User,
        purpose: Purpose,
    ) -> DomainResult<VerificationRecord> {
        let secret = self.generator.generate(purpose.secret_kind())?;
        let now = self.clock.now();
        let record =
            VerificationRecord::new(user.id, purpose, secret, self.config.ttl_for(purpose), now);

        let record = if purpose.supersedes_outstanding() {
            let outcome = self.records.supersede_and_insert(record).await?;
            if outcome.superseded > 0 {
                tracing::info!(
                    user_id = %user.id,
                    purpose = %purpose,
                    superseded = outcome.superseded,
                    event = "codes_superseded",
                    "Invalidated outstanding codes"
                );
            }
            outcome.record
        } else {
            self.records.insert(record).await?
        };

        tracing::info!(
            user_id = %user.id,
            purpose = %purpose,
            record_id = %record.id,
            expires_at = %record.expires_at,
            event = "code_issued",
            "Issued verification record"
        );

        if let Err(e) = self.notifications.enqueue(Notification::for_record(&record)) {
            tracing::error!(
                user_id = %user.id,
                purpose = %purpose,
                record_id = %record.id,
                error = %e,
                event = "notification_failed",
                "Could not queue notification"
            );
        }

        Ok(record)
    }
}
