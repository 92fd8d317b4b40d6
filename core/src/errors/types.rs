//! Error types for the verification and account flows

use kg_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Public message for both unknown and no-longer-valid codes
pub const INVALID_CODE_MESSAGE: &str = "Invalid or expired code";

/// Errors raised while issuing or confirming verification records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// No matching user or record
    #[error("Verification record not found")]
    NotFound,

    /// A matching record exists but is used or expired
    #[error("Verification record is used or expired")]
    Invalid,

    #[error("Email address is already verified")]
    AlreadyVerified,

    #[error("Password does not meet policy: {}", reasons.join("; "))]
    PasswordPolicy { reasons: Vec<String> },

    #[error("Too many requests for {scope}, try again later")]
    RateLimitExceeded { scope: String },
}

/// Account errors outside the code lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("An account with this email already exists")]
    EmailAlreadyRegistered,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email address has not been verified")]
    EmailNotVerified,
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid format for field: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid length for field: {field} (expected: {expected}, actual: {actual})")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid email format")]
    InvalidEmail,
}

impl IntoErrorResponse for VerificationError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            // Unknown and spent codes must look the same to the caller
            VerificationError::NotFound | VerificationError::Invalid => {
                ErrorResponse::new(error_codes::INVALID_CODE, INVALID_CODE_MESSAGE)
            }
            VerificationError::AlreadyVerified => {
                ErrorResponse::new(error_codes::ALREADY_VERIFIED, self.to_string())
            }
            VerificationError::PasswordPolicy { reasons } => ErrorResponse::new(
                error_codes::PASSWORD_POLICY,
                "Password does not meet the password policy",
            )
            .add_detail("reasons", reasons),
            VerificationError::RateLimitExceeded { .. } => ErrorResponse::new(
                error_codes::RATE_LIMIT_EXCEEDED,
                "Too many requests, please try again later",
            ),
        }
    }
}

impl From<VerificationError> for ErrorResponse {
    fn from(err: VerificationError) -> Self {
        err.to_error_response()
    }
}

impl IntoErrorResponse for AccountError {
    fn to_error_response(&self) -> ErrorResponse {
        let error_code = match self {
            AccountError::EmailAlreadyRegistered => error_codes::EMAIL_ALREADY_REGISTERED,
            AccountError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            AccountError::EmailNotVerified => error_codes::EMAIL_NOT_VERIFIED,
        };
        ErrorResponse::new(error_code, self.to_string())
    }
}

impl From<AccountError> for ErrorResponse {
    fn from(err: AccountError) -> Self {
        err.to_error_response()
    }
}

impl IntoErrorResponse for ValidationError {
    fn to_error_response(&self) -> ErrorResponse {
        let error_code = match self {
            ValidationError::InvalidEmail => error_codes::INVALID_EMAIL,
            _ => error_codes::VALIDATION_ERROR,
        };
        ErrorResponse::new(error_code, self.to_string())
    }
}

impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        err.to_error_response()
    }
}
