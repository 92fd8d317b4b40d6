//! Account flows built on issuance and confirmation

use kg_shared::email::{mask_email, parse_email};
use std::sync::Arc;

use crate::domain::entities::user::{NewUser, User};
use crate::domain::entities::verification_record::Purpose;
use crate::errors::{AccountError, DomainResult, ValidationError, VerificationError};
use crate::repositories::{UserRepository, VerificationRepository};
use crate::services::clock::Clock;
use crate::services::password::{PasswordHasher, PasswordPolicy};
use crate::services::rate_limit::{quota_key, QuotaChecker};

use super::config::VerificationServiceConfig;
use super::confirmation::ConfirmationFlow;
use super::deps::ServiceDependencies;
use super::issuance::IssuancePolicy;
use super::types::{
    ConfirmationEffect, ConfirmationKey, ConfirmationReceipt, IssueAcknowledgement,
};

/// Registration, email verification, password reset and sign-in
pub struct VerificationService<U, R>
where
    U: UserRepository,
    R: VerificationRepository,
{
    users: Arc<U>,
    issuance: IssuancePolicy<U, R>,
    confirmation: ConfirmationFlow<U, R>,
    quota: Arc<dyn QuotaChecker>,
    clock: Arc<dyn Clock>,
    password_policy: Arc<dyn PasswordPolicy>,
    hasher: PasswordHasher,
}

impl<U, R> VerificationService<U, R>
where
    U: UserRepository,
    R: VerificationRepository,
{
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `users` - User directory
    /// * `records` - Verification record store
    /// * `deps` - Queue, quota, clock, password policy and hasher
    /// * `config` - Record lifetimes
    pub fn new(
        users: Arc<U>,
        records: Arc<R>,
        deps: ServiceDependencies,
        config: VerificationServiceConfig,
    ) -> Self {
        let issuance = IssuancePolicy::new(users.clone(), records.clone(), &deps, config);
        let confirmation = ConfirmationFlow::new(users.clone(), records, &deps);

        Self {
            users,
            issuance,
            confirmation,
            quota: deps.quota,
            clock: deps.clock,
            password_policy: deps.password_policy,
            hasher: deps.hasher,
        }
    }

    pub fn issuance(&self) -> &IssuancePolicy<U, R> {
        &self.issuance
    }

    pub fn confirmation(&self) -> &ConfirmationFlow<U, R> {
        &self.confirmation
    }

    /// Register a new, unverified account and send its first verification code
    ///
    /// A failure to issue that code is logged, not returned.
    pub async fn register_user(&self, new_user: NewUser) -> DomainResult<User> {
        let email = parse_email(&new_user.email).ok_or(ValidationError::InvalidEmail)?;

        // Policy runs against the prospective account so similarity checks apply
        let candidate = User::new(
            email.clone(),
            new_user.first_name.trim().to_string(),
            new_user.last_name.trim().to_string(),
            String::new(),
            self.clock.now(),
        );
        self.password_policy
            .validate(&new_user.password, Some(&candidate))
            .map_err(|reasons| VerificationError::PasswordPolicy { reasons })?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailAlreadyRegistered.into());
        }

        let password_hash = self.hasher.hash(&new_user.password).await?;
        let user = self
            .users
            .create(User {
                password_hash,
                ..candidate
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            email = %mask_email(&user.email),
            event = "user_registered",
            "Registered new account"
        );

        // The account exists either way; the user can ask for a resend
        if let Err(e) = self
            .issuance
            .issue_for_user(&user, Purpose::EmailVerification)
            .await
        {
            tracing::error!(
                user_id = %user.id,
                error = %e,
                event = "registration_verification_failed",
                "Could not issue verification code after registration"
            );
        }
        Ok(user)
    }

    /// Send another email verification code
    pub async fn resend_email_verification(&self, email: &str) -> DomainResult<IssueAcknowledgement> {
        self.issuance
            .request_issue(email, Purpose::EmailVerification)
            .await
    }

    /// Confirm an email verification code
    pub async fn verify_email(&self, email: &str, code: &str) -> DomainResult<ConfirmationReceipt> {
        self.confirmation
            .confirm(
                ConfirmationKey::Email(email),
                code,
                Purpose::EmailVerification,
                ConfirmationEffect::MarkEmailVerified,
            )
            .await
    }

    /// Send a password reset code, superseding earlier ones
    pub async fn request_password_reset_otp(&self, email: &str) -> DomainResult<IssueAcknowledgement> {
        self.issuance
            .request_issue(email, Purpose::PasswordResetOtp)
            .await
    }

    /// Reset the password with an emailed code
    pub async fn confirm_password_reset_otp(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> DomainResult<ConfirmationReceipt> {
        self.confirmation
            .confirm(
                ConfirmationKey::Email(email),
                code,
                Purpose::PasswordResetOtp,
                ConfirmationEffect::SetPassword(new_password.to_string()),
            )
            .await
    }

    /// Send a password reset link
    pub async fn request_password_reset_token(
        &self,
        email: &str,
    ) -> DomainResult<IssueAcknowledgement> {
        self.issuance
            .request_issue(email, Purpose::PasswordResetToken)
            .await
    }

    /// Reset the password with a link token
    pub async fn confirm_password_reset_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> DomainResult<ConfirmationReceipt> {
        self.confirmation
            .confirm(
                ConfirmationKey::Token,
                token,
                Purpose::PasswordResetToken,
                ConfirmationEffect::SetPassword(new_password.to_string()),
            )
            .await
    }

    /// Check credentials
    ///
    /// An unverified account is refused with `EmailNotVerified`. Before
    /// refusing, a fresh verification code is issued as an independent step
    /// (subject to the resend quota); its outcome does not change the result.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        let Some(email) = parse_email(email) else {
            return Err(AccountError::InvalidCredentials.into());
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.hasher.verify_dummy(password).await?;
            tracing::info!(
                email = %mask_email(&email),
                reason = "unknown_user",
                event = "login_failed",
                "Login failed"
            );
            return Err(AccountError::InvalidCredentials.into());
        };

        if !user.is_active || !self.hasher.verify(password, &user.password_hash).await? {
            let reason = if user.is_active { "wrong_password" } else { "inactive" };
            tracing::info!(
                user_id = %user.id,
                reason = reason,
                event = "login_failed",
                "Login failed"
            );
            return Err(AccountError::InvalidCredentials.into());
        }

        if !user.is_email_verified {
            self.issue_login_verification(&user).await;
            return Err(AccountError::EmailNotVerified.into());
        }

        tracing::info!(user_id = %user.id, event = "login_succeeded", "Login succeeded");
        Ok(user)
    }

    async fn issue_login_verification(&self, user: &User) {
        let key = quota_key(Purpose::EmailVerification.quota_scope(), &user.email);
        match self.quota.check_and_consume_quota(&key).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(
                    user_id = %user.id,
                    event = "rate_limit_exceeded",
                    "Skipping login verification code, quota exhausted"
                );
                return;
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Quota check failed");
                return;
            }
        }

        if let Err(e) = self
            .issuance
            .issue_for_user(user, Purpose::EmailVerification)
            .await
        {
            tracing::error!(
                user_id = %user.id,
                error = %e,
                event = "login_verification_failed",
                "Could not issue verification code after login attempt"
            );
        }
    }
}
