//! Confirmation flow: check a submitted secret, apply its effect, consume it

use kg_shared::email::{mask_email, parse_email};
use std::sync::Arc;

use crate::domain::entities::user::User;
use crate::domain::entities::verification_record::{Purpose, VerificationRecord};
use crate::errors::{DomainError, DomainResult, ValidationError, VerificationError};
use crate::repositories::{UserRepository, VerificationRepository};
use crate::services::clock::Clock;
use crate::services::password::{PasswordHasher, PasswordPolicy};

use super::deps::ServiceDependencies;
use super::types::{ConfirmationEffect, ConfirmationKey, ConfirmationReceipt};

// Effect with its preconditions already checked
enum PreparedEffect {
    MarkEmailVerified,
    StorePasswordHash(String),
}

/// Validates and consumes verification records
pub struct ConfirmationFlow<U, R>
where
    U: UserRepository,
    R: VerificationRepository,
{
    users: Arc<U>,
    records: Arc<R>,
    clock: Arc<dyn Clock>,
    password_policy: Arc<dyn PasswordPolicy>,
    hasher: PasswordHasher,
}

impl<U, R> ConfirmationFlow<U, R>
where
    U: UserRepository,
    R: VerificationRepository,
{
    pub fn new(users: Arc<U>, records: Arc<R>, deps: &ServiceDependencies) -> Self {
        Self {
            users,
            records,
            clock: deps.clock.clone(),
            password_policy: deps.password_policy.clone(),
            hasher: deps.hasher.clone(),
        }
    }

    /// Confirm a submitted code or token
    ///
    /// Effect preconditions (password policy) are checked first, then the
    /// effect is applied, then the record is consumed with a conditional
    /// update. A failed effect leaves the record unused. Of two concurrent
    /// confirmations only the one that wins the update succeeds; the other
    /// reports `Invalid`, though its idempotent effect may already be applied.
    ///
    /// # Errors
    /// * `ValidationError` - Malformed email or secret, nothing looked up
    /// * `VerificationError::NotFound` - No such user or matching record
    /// * `VerificationError::Invalid` - Record used, expired, or consumed concurrently
    /// * `VerificationError::PasswordPolicy` - New password rejected
    pub async fn confirm(
        &self,
        key: ConfirmationKey<'_>,
        secret: &str,
        purpose: Purpose,
        effect: ConfirmationEffect,
    ) -> DomainResult<ConfirmationReceipt> {
        let kind = purpose.secret_kind();
        if !kind.is_well_formed(secret) {
            return Err(ValidationError::InvalidFormat {
                field: kind.field_name().to_string(),
            }
            .into());
        }
        if !effect.applies_to(purpose) {
            return Err(DomainError::Validation {
                message: format!("{:?} does not apply to {}", effect, purpose),
            });
        }

        let (user, record) = self.resolve(key, secret, purpose).await?;

        let now = self.clock.now();
        if !record.is_valid_at(now) {
            let reason = if record.is_used { "used" } else { "expired" };
            return Err(self.reject(purpose, Some(&user), reason, VerificationError::Invalid));
        }

        let prepared = match effect {
            ConfirmationEffect::MarkEmailVerified => PreparedEffect::MarkEmailVerified,
            ConfirmationEffect::SetPassword(password) => {
                if let Err(reasons) = self.password_policy.validate(&password, Some(&user)) {
                    return Err(self.reject(
                        purpose,
                        Some(&user),
                        "password_policy",
                        VerificationError::PasswordPolicy { reasons },
                    ));
                }
                PreparedEffect::StorePasswordHash(self.hasher.hash(&password).await?)
            }
        };

        // Effect first: the record stays unused if it fails
        let applied = match prepared {
            PreparedEffect::MarkEmailVerified => self.users.mark_email_verified(user.id, now).await?,
            PreparedEffect::StorePasswordHash(hash) => {
                self.users.set_password_hash(user.id, &hash, now).await?
            }
        };
        if !applied {
            return Err(self.reject(purpose, None, "user_removed", VerificationError::NotFound));
        }

        if !self.records.mark_as_used(purpose, record.id, now).await? {
            return Err(self.reject(purpose, Some(&user), "already_consumed", VerificationError::Invalid));
        }

        tracing::info!(
            user_id = %user.id,
            purpose = %purpose,
            record_id = %record.id,
            event = "code_consumed",
            "Verification record consumed"
        );

        Ok(ConfirmationReceipt {
            user_id: user.id,
            record_id: record.id,
            purpose,
        })
    }

    async fn resolve(
        &self,
        key: ConfirmationKey<'_>,
        secret: &str,
        purpose: Purpose,
    ) -> DomainResult<(User, VerificationRecord)> {
        match key {
            ConfirmationKey::Email(email) => {
                if purpose == Purpose::PasswordResetToken {
                    return Err(DomainError::Validation {
                        message: "link tokens are confirmed without an email".to_string(),
                    });
                }
                let email = parse_email(email).ok_or(ValidationError::InvalidEmail)?;

                let Some(user) = self.users.find_by_email(&email).await? else {
                    tracing::info!(
                        email = %mask_email(&email),
                        purpose = %purpose,
                        reason = "unknown_user",
                        event = "confirmation_rejected",
                        "Confirmation rejected"
                    );
                    return Err(VerificationError::NotFound.into());
                };

                match self
                    .records
                    .find_latest_unused(purpose, user.id, secret)
                    .await?
                {
                    Some(record) => Ok((user, record)),
                    None => Err(self.reject(purpose, Some(&user), "no_match", VerificationError::NotFound)),
                }
            }
            ConfirmationKey::Token => {
                if purpose != Purpose::PasswordResetToken {
                    return Err(DomainError::Validation {
                        message: "codes are confirmed together with an email".to_string(),
                    });
                }

                // A spent token is reported exactly like an unknown one
                let record = self
                    .records
                    .find_by_secret(purpose, secret)
                    .await?
                    .filter(|r| !r.is_used);
                let Some(record) = record else {
                    return Err(self.reject(purpose, None, "no_match", VerificationError::NotFound));
                };
                match self.users.find_by_id(record.user_id).await? {
                    Some(user) => Ok((user, record)),
                    None => Err(self.reject(purpose, None, "unknown_user", VerificationError::NotFound)),
                }
            }
        }
    }

    fn reject(
        &self,
        purpose: Purpose,
        user: Option<&User>,
        reason: &'static str,
        error: VerificationError,
    ) -> DomainError {
        let user_id = user.map(|u| u.id.to_string());
        tracing::info!(
            user_id = user_id.as_deref(),
            purpose = %purpose,
            reason = reason,
            event = "confirmation_rejected",
            "Confirmation rejected"
        );
        error.into()
    }
}
